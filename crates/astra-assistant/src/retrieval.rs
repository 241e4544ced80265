use astra_persist::{Post, PostRepository};
use serde::Deserialize;

use crate::error::{AssistantError, Result};
use crate::query::Query;

/// Text embedded in the prompt when the repository has no posts
pub const NO_POSTS_SENTINEL: &str = "No relevant posts found!";

/// Optional bounds on the corpus. Both unset means every post, verbatim, in
/// repository order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RetrievalLimits {
    /// Keep only the K best-matching posts
    #[serde(default)]
    pub max_items: Option<usize>,
    /// Stop adding blocks once the corpus would exceed this many characters
    #[serde(default)]
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievedCorpus {
    NoPosts,
    Posts(Vec<String>),
}

impl RetrievedCorpus {
    pub fn blocks(&self) -> &[String] {
        match self {
            RetrievedCorpus::NoPosts => &[],
            RetrievedCorpus::Posts(blocks) => blocks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks().is_empty()
    }

    /// Pretty-printed JSON: an array of blocks, or the sentinel string
    pub fn to_prompt_text(&self) -> String {
        let rendered = match self {
            RetrievedCorpus::NoPosts => serde_json::to_string_pretty(NO_POSTS_SENTINEL),
            RetrievedCorpus::Posts(blocks) => serde_json::to_string_pretty(blocks),
        };
        rendered.unwrap_or_default()
    }
}

/// Render one post as a corpus block. Absent optional fields are empty.
pub fn format_post(post: &Post) -> String {
    format!(
        "ID:{}\nTitle:{}\nContent:{}\nAuthor:{}\nReference:{}\nImage:{}",
        post.id,
        post.title,
        post.content,
        post.author,
        post.reference.as_deref().unwrap_or_default(),
        post.image.as_deref().unwrap_or_default(),
    )
}

#[derive(Debug, Clone, Default)]
pub struct RetrievalFormatter {
    limits: RetrievalLimits,
}

impl RetrievalFormatter {
    pub fn new(limits: RetrievalLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> RetrievalLimits {
        self.limits
    }

    /// Read every post and turn it into a corpus for `query`.
    ///
    /// A repository failure is reported as `SearchFailed`; the caller must not
    /// build a prompt from a partial result.
    pub async fn retrieve(
        &self,
        posts: &dyn PostRepository,
        query: &Query,
    ) -> Result<RetrievedCorpus> {
        let all = posts
            .list_posts()
            .await
            .map_err(AssistantError::SearchFailed)?;

        Ok(self.format(all, query))
    }

    pub fn format(&self, posts: Vec<Post>, query: &Query) -> RetrievedCorpus {
        if posts.is_empty() {
            return RetrievedCorpus::NoPosts;
        }

        let posts = match self.limits.max_items {
            Some(k) => rank(posts, query).into_iter().take(k.max(1)).collect(),
            None => posts,
        };

        let mut blocks: Vec<String> = posts.iter().map(format_post).collect();

        if let Some(max_chars) = self.limits.max_chars {
            truncate_to_budget(&mut blocks, max_chars);
        }

        RetrievedCorpus::Posts(blocks)
    }
}

/// Stable sort by descending term-match score; ties keep repository order.
fn rank(mut posts: Vec<Post>, query: &Query) -> Vec<Post> {
    let terms = query.terms();
    if terms.is_empty() {
        return posts;
    }

    posts.sort_by_cached_key(|post| std::cmp::Reverse(score(post, &terms)));
    posts
}

fn score(post: &Post, terms: &[String]) -> usize {
    let haystack = format!("{}\n{}", post.title, post.content).to_lowercase();
    terms
        .iter()
        .map(|term| haystack.matches(term.as_str()).count())
        .sum()
}

/// Keep leading blocks while the total stays within `max_chars`. The first
/// block is always kept.
fn truncate_to_budget(blocks: &mut Vec<String>, max_chars: usize) {
    let mut total = 0;
    let mut keep = 0;
    for block in blocks.iter() {
        let len = block.chars().count();
        if keep > 0 && total + len > max_chars {
            break;
        }
        total += len;
        keep += 1;
    }
    blocks.truncate(keep);
}

#[cfg(test)]
mod tests {
    use super::*;
    use astra_persist::{InMemoryStore, NewPost, PersistError, PostUpdate};
    use async_trait::async_trait;
    use chrono::Utc;

    fn post(id: &str, title: &str, content: &str) -> Post {
        Post {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            author: "Ali".to_string(),
            reference: None,
            image: None,
            created_at: Utc::now(),
        }
    }

    fn query(q: &str) -> Query {
        Query::parse(q).unwrap()
    }

    #[test]
    fn test_empty_collection_is_sentinel() {
        let corpus = RetrievalFormatter::default().format(vec![], &query("anything"));

        assert_eq!(corpus, RetrievedCorpus::NoPosts);
        assert_eq!(corpus.to_prompt_text(), "\"No relevant posts found!\"");
    }

    #[test]
    fn test_one_block_per_post_in_order() {
        let posts = vec![post("1", "Rust", "fast"), post("2", "Go", "simple"), post("3", "Zig", "new")];

        let corpus = RetrievalFormatter::default().format(posts, &query("go"));

        let ids: Vec<_> = corpus
            .blocks()
            .iter()
            .map(|b| b.lines().next().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["ID:1", "ID:2", "ID:3"]);
    }

    #[test]
    fn test_absent_optional_fields_render_empty() {
        let block = format_post(&post("1", "Title", "Body"));

        assert_eq!(
            block,
            "ID:1\nTitle:Title\nContent:Body\nAuthor:Ali\nReference:\nImage:"
        );
        assert!(!block.contains("null"));
        assert!(!block.contains("undefined"));
        assert!(!block.contains("None"));
    }

    #[test]
    fn test_present_optional_fields() {
        let mut p = post("7", "T", "C");
        p.reference = Some("https://ref".to_string());
        p.image = Some("https://img".to_string());

        let block = format_post(&p);
        assert!(block.ends_with("Reference:https://ref\nImage:https://img"));
    }

    #[test]
    fn test_max_items_ranks_by_term_matches() {
        let posts = vec![
            post("1", "Cooking", "pasta"),
            post("2", "Rust async", "tokio and rust futures"),
            post("3", "Rust", "ownership"),
        ];
        let formatter = RetrievalFormatter::new(RetrievalLimits {
            max_items: Some(2),
            max_chars: None,
        });

        let corpus = formatter.format(posts, &query("rust tokio"));

        assert_eq!(corpus.blocks().len(), 2);
        assert!(corpus.blocks()[0].starts_with("ID:2"));
        assert!(corpus.blocks()[1].starts_with("ID:3"));
    }

    #[test]
    fn test_max_chars_keeps_first_block() {
        let posts = vec![post("1", "A", &"x".repeat(100)), post("2", "B", "short")];
        let formatter = RetrievalFormatter::new(RetrievalLimits {
            max_items: None,
            max_chars: Some(10),
        });

        let corpus = formatter.format(posts, &query("anything"));

        assert_eq!(corpus.blocks().len(), 1);
        assert!(corpus.blocks()[0].starts_with("ID:1"));
    }

    struct FailingRepo;

    #[async_trait]
    impl PostRepository for FailingRepo {
        async fn list_posts(&self) -> astra_persist::Result<Vec<Post>> {
            Err(PersistError::Connection("unreachable".to_string()))
        }
        async fn list_recent(&self, _: Option<usize>) -> astra_persist::Result<Vec<Post>> {
            unimplemented!()
        }
        async fn get_post(&self, _: &str) -> astra_persist::Result<Option<Post>> {
            unimplemented!()
        }
        async fn create_post(&self, _: NewPost, _: &str) -> astra_persist::Result<Post> {
            unimplemented!()
        }
        async fn update_post(&self, _: &str, _: PostUpdate) -> astra_persist::Result<Post> {
            unimplemented!()
        }
        async fn delete_post(&self, _: &str) -> astra_persist::Result<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_repository_failure_is_search_failed() {
        let err = RetrievalFormatter::default()
            .retrieve(&FailingRepo, &query("rust"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::SearchFailed(_)));
        assert_eq!(err.to_string(), "Error Searching Posts");
    }

    #[tokio::test]
    async fn test_retrieve_from_store() {
        let store = InMemoryStore::new();
        store.create_post(NewPost::new("Hello", "World"), "Ali").await.unwrap();

        let corpus = RetrievalFormatter::default()
            .retrieve(&store, &query("hello"))
            .await
            .unwrap();

        assert_eq!(corpus.blocks().len(), 1);
        assert!(corpus.blocks()[0].contains("Title:Hello"));
    }
}
