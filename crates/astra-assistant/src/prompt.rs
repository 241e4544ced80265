use serde::Deserialize;

use crate::query::Query;
use crate::retrieval::RetrievedCorpus;

/// Who the assistant says it is, and what site it speaks for
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Persona {
    pub creator: String,
    pub site_name: String,
    pub site_topic: String,
    pub site_purpose: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            creator: "AstraX".to_string(),
            site_name: "Astra Blog".to_string(),
            site_topic: "changing trends in tech".to_string(),
            site_purpose: "to make people aware of technology".to_string(),
        }
    }
}

/// Builds the single grounding instruction sent to the generation model
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    persona: Persona,
}

impl PromptComposer {
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// The corpus is embedded verbatim as context and the query is quoted as
    /// the question to answer.
    pub fn compose(&self, query: &Query, corpus: &RetrievedCorpus) -> String {
        let Persona {
            creator,
            site_name,
            site_topic,
            site_purpose,
        } = &self.persona;

        format!(
            "I'm providing data from my blog posts below:\n\n\
             {corpus}\n\n\
             Using this data, analyze and respond to the following user query: \"{query}\".\n\
             Provide a clear, concise, and relevant answer based solely on the blog post data \
             unless the query explicitly asks for external information.\n\
             If the data is insufficient to answer the query, say so and suggest what additional \
             information might be needed.\n\
             If no relevant data is found, share general knowledge about the topic and do not \
             fabricate details.\n\
             You were created by {creator}. This website is {site_name}, a blog with posts about \
             {site_topic}; its purpose is {site_purpose}.",
            corpus = corpus.to_prompt_text(),
            query = query.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> RetrievedCorpus {
        RetrievedCorpus::Posts(vec![
            "ID:1\nTitle:Quantum chips\nContent:Qubits are fragile\nAuthor:Ali\nReference:\nImage:"
                .to_string(),
        ])
    }

    #[test]
    fn test_query_and_corpus_appear_once() {
        let query = Query::parse("zebra-striped heat sinks").unwrap();
        let corpus = corpus();

        let prompt = PromptComposer::default().compose(&query, &corpus);

        assert_eq!(prompt.matches("zebra-striped heat sinks").count(), 1);
        assert_eq!(prompt.matches(&corpus.to_prompt_text()).count(), 1);
        assert!(prompt.contains("query: \"zebra-striped heat sinks\""));
    }

    #[test]
    fn test_sentinel_corpus_still_composes() {
        let query = Query::parse("anything at all").unwrap();

        let prompt = PromptComposer::default().compose(&query, &RetrievedCorpus::NoPosts);

        assert!(prompt.contains("\"No relevant posts found!\""));
        assert!(prompt.contains("\"anything at all\""));
    }

    #[test]
    fn test_persona_named() {
        let persona = Persona {
            creator: "Acme".to_string(),
            site_name: "Acme Notes".to_string(),
            site_topic: "gardening".to_string(),
            site_purpose: "to share tips".to_string(),
        };
        let query = Query::parse("roses").unwrap();

        let prompt = PromptComposer::new(persona).compose(&query, &corpus());

        assert!(prompt.contains("created by Acme"));
        assert!(prompt.contains("This website is Acme Notes"));
        assert!(prompt.contains("solely on the blog post data"));
    }
}
