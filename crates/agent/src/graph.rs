//! The orchestration graph.
//!
//! A directed control-flow graph with six nodes and conditional edges:
//!
//! ```text
//! generate_initial ──► check_uncertainty ──► done (answer was confident)
//!                              │
//!                              ▼
//!                          retrieve ──► evaluate_context ──► generate_final ──► done
//!                                              │                   ▲
//!                                              ▼                   │
//!                                          web_search ─────────────┘
//! ```
//!
//! Each node is a function over the shared [`TutorState`]; the runner loop
//! follows `next_step` transitions until `Done`.

use crate::guardrails::{self, REFUSAL_MESSAGE};
use crate::heuristics;
use crate::prompts;
use crate::state::{Step, TutorState};
use mathtutor_core::AppResult;
use mathtutor_knowledge::Retriever;
use mathtutor_llm::{ChatRequest, LlmClient};
use mathtutor_search::{format_results, SearchClient};
use std::sync::Arc;

/// The math tutoring agent.
///
/// Holds process-wide singleton handles to the LLM, the knowledge base, and
/// the optional search client. Built once at startup and shared read-only by
/// the request path.
pub struct MathAgent {
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn Retriever>,
    search: Option<Arc<dyn SearchClient>>,
    model: String,
    search_min_score: f32,
}

/// Builder for [`MathAgent`].
pub struct MathAgentBuilder {
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn Retriever>,
    search: Option<Arc<dyn SearchClient>>,
    model: String,
    search_min_score: f32,
}

impl MathAgentBuilder {
    /// Start building an agent from its two required handles.
    pub fn new(llm: Arc<dyn LlmClient>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            llm,
            retriever,
            search: None,
            model: "qwen2.5-math".to_string(),
            search_min_score: 0.75,
        }
    }

    /// Attach a web-search client for the fallback branch.
    pub fn with_search(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    /// Set the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the minimum score for search results to enter the context.
    pub fn with_search_min_score(mut self, min_score: f32) -> Self {
        self.search_min_score = min_score;
        self
    }

    pub fn build(self) -> MathAgent {
        MathAgent {
            llm: self.llm,
            retriever: self.retriever,
            search: self.search,
            model: self.model,
            search_min_score: self.search_min_score,
        }
    }
}

impl MathAgent {
    /// Run the full graph for one question and return the terminal state.
    pub async fn run(&self, question: &str) -> AppResult<TutorState> {
        let mut state = TutorState::new(question);

        loop {
            let step = state.next_step;
            tracing::debug!(step = step.as_str(), "Entering graph node");

            state.next_step = match step {
                Step::GenerateInitial => self.generate_initial(&mut state).await?,
                Step::CheckUncertainty => self.check_uncertainty(&state),
                Step::Retrieve => self.retrieve(&mut state).await?,
                Step::EvaluateContext => self.evaluate_context(&state),
                Step::WebSearch => self.web_search(&mut state).await,
                Step::GenerateFinal => self.generate_final(&mut state).await?,
                Step::Done => break,
            };
        }

        Ok(state)
    }

    /// Run the graph with input and output guardrails applied.
    ///
    /// Guard rejections never surface as errors: the input guard maps to a
    /// canned off-topic reply, the output guard to a generic refusal.
    pub async fn answer(&self, question: &str) -> AppResult<String> {
        let validated = match guardrails::check_input(question) {
            Ok(q) => q,
            Err(e) => {
                tracing::info!("Input guard triggered: {}", e);
                return Ok(guardrails::OFF_TOPIC_MESSAGE.to_string());
            }
        };

        let state = self.run(&validated).await?;

        match guardrails::check_output(&state.answer) {
            Ok(()) => Ok(state.answer),
            Err(e) => {
                tracing::warn!("Output guard triggered: {}", e);
                Ok(REFUSAL_MESSAGE.to_string())
            }
        }
    }

    /// Ask the model to answer from its own knowledge, no context.
    async fn generate_initial(&self, state: &mut TutorState) -> AppResult<Step> {
        state.answer = self.complete(&state.question, "").await?;
        Ok(Step::CheckUncertainty)
    }

    /// Route on uncertainty markers in the initial answer.
    fn check_uncertainty(&self, state: &TutorState) -> Step {
        if heuristics::is_uncertain(&state.answer) {
            tracing::info!("Initial answer uncertain; consulting knowledge base");
            Step::Retrieve
        } else {
            Step::Done
        }
    }

    /// Pull relevant snippets from the knowledge base into the context.
    async fn retrieve(&self, state: &mut TutorState) -> AppResult<Step> {
        let snippets = self.retriever.retrieve(&state.question).await?;
        state
            .context
            .extend(snippets.into_iter().map(|s| s.text));
        Ok(Step::EvaluateContext)
    }

    /// Route on whether the retrieved context covers the question.
    fn evaluate_context(&self, state: &TutorState) -> Step {
        if heuristics::context_sufficient(&state.question, &state.context_block()) {
            Step::GenerateFinal
        } else {
            tracing::info!("Knowledge base context insufficient; falling back to web search");
            Step::WebSearch
        }
    }

    /// Web-search fallback. Failures degrade silently to existing context.
    async fn web_search(&self, state: &mut TutorState) -> Step {
        let Some(ref search) = self.search else {
            tracing::debug!("No search client configured; skipping web search");
            return Step::GenerateFinal;
        };

        match search.search(&state.question).await {
            Ok(hits) => {
                let snippets = format_results(&hits, self.search_min_score);
                tracing::info!("Web search contributed {} snippets", snippets.len());
                state.context.extend(snippets);
            }
            Err(e) => {
                tracing::warn!("Web search failed, continuing with existing context: {}", e);
            }
        }

        Step::GenerateFinal
    }

    /// Generate the final answer conditioned on the accumulated context.
    async fn generate_final(&self, state: &mut TutorState) -> AppResult<Step> {
        state.answer = self
            .complete(&state.question, &state.context_block())
            .await?;
        Ok(Step::Done)
    }

    async fn complete(&self, question: &str, context: &str) -> AppResult<String> {
        let request = ChatRequest::new(&self.model)
            .with_system(prompts::SYSTEM_PROMPT)
            .with_user(prompts::build_user_prompt(question, context))
            .with_temperature(0.3);

        let response = self.llm.chat(&request).await?;
        Ok(prompts::extract_steps(&response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathtutor_core::{AppError, AppResult};
    use mathtutor_knowledge::ScoredSnippet;
    use mathtutor_llm::{LlmResponse, LlmUsage};
    use mathtutor_search::SearchHit;
    use std::sync::Mutex;

    /// LLM returning scripted responses in order.
    struct ScriptedLlm {
        responses: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().rev().map(String::from).collect()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _request: &ChatRequest) -> AppResult<LlmResponse> {
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| "unexpected call".to_string());
            Ok(LlmResponse {
                content,
                model: "scripted".to_string(),
                usage: LlmUsage::default(),
                done: true,
            })
        }
    }

    /// Retriever returning fixed snippets.
    struct FixedRetriever {
        snippets: Vec<ScoredSnippet>,
    }

    #[async_trait::async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str) -> AppResult<Vec<ScoredSnippet>> {
            Ok(self.snippets.clone())
        }
    }

    /// Search client returning fixed hits or a scripted failure.
    struct FixedSearch {
        hits: Vec<SearchHit>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl SearchClient for FixedSearch {
        async fn search(&self, _query: &str) -> AppResult<Vec<SearchHit>> {
            if self.fail {
                return Err(AppError::Search("connection reset".to_string()));
            }
            Ok(self.hits.clone())
        }
    }

    fn retriever_with(texts: &[&str]) -> Arc<FixedRetriever> {
        Arc::new(FixedRetriever {
            snippets: texts
                .iter()
                .map(|t| ScoredSnippet {
                    text: t.to_string(),
                    score: 0.9,
                })
                .collect(),
        })
    }

    #[tokio::test]
    async fn test_confident_answer_skips_retrieval() {
        let llm = ScriptedLlm::new(vec!["x = 4. **Final Answer:** boxed{4}"]);
        let agent = MathAgentBuilder::new(llm, retriever_with(&[])).build();

        let state = agent.run("Solve 2x = 8").await.unwrap();

        assert_eq!(state.answer, "x = 4. **Final Answer:** boxed{4}");
        assert!(state.context.is_empty());
        assert_eq!(state.next_step, Step::Done);
    }

    #[tokio::test]
    async fn test_uncertain_answer_uses_knowledge_base() {
        let llm = ScriptedLlm::new(vec![
            "Let's search the web",
            "Based on the worked example, x = 4.",
        ]);
        let retriever = retriever_with(&[
            "Mathematical Problem: solve 2x = 8. Step-by-Step Solution: divide by 2, x = 4.",
        ]);
        let agent = MathAgentBuilder::new(llm, retriever).build();

        let state = agent.run("solve 2x = 8").await.unwrap();

        assert_eq!(state.answer, "Based on the worked example, x = 4.");
        assert_eq!(state.context.len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_context_falls_back_to_search() {
        let llm = ScriptedLlm::new(vec!["I don't know.", "Per the web snippet, the answer is 7."]);
        // Retrieval returns something unrelated to the question
        let retriever = retriever_with(&["ancient history of rome and its emperors"]);
        let search = Arc::new(FixedSearch {
            hits: vec![SearchHit {
                title: "Khan Academy".to_string(),
                url: "https://khanacademy.org/x".to_string(),
                content: "To solve such puzzles you count in base seven.".to_string(),
                score: 0.92,
            }],
            fail: false,
        });
        let agent = MathAgentBuilder::new(llm, retriever)
            .with_search(search)
            .build();

        let state = agent.run("mystery number puzzle seven").await.unwrap();

        assert_eq!(state.answer, "Per the web snippet, the answer is 7.");
        // KB snippet plus one formatted search snippet
        assert_eq!(state.context.len(), 2);
        assert!(state.context[1].contains("### Khan Academy"));
    }

    #[tokio::test]
    async fn test_search_failure_degrades_silently() {
        let llm = ScriptedLlm::new(vec!["I don't know.", "Best effort answer."]);
        let retriever = retriever_with(&["unrelated text about cooking"]);
        let search = Arc::new(FixedSearch {
            hits: vec![],
            fail: true,
        });
        let agent = MathAgentBuilder::new(llm, retriever)
            .with_search(search)
            .build();

        let state = agent.run("integral of exp").await.unwrap();

        // Graph still terminates with a generated answer
        assert_eq!(state.answer, "Best effort answer.");
        assert_eq!(state.context.len(), 1);
    }

    #[tokio::test]
    async fn test_low_scoring_hits_excluded_from_context() {
        let llm = ScriptedLlm::new(vec!["I don't know.", "final"]);
        let retriever = retriever_with(&[]);
        let search = Arc::new(FixedSearch {
            hits: vec![SearchHit {
                title: "weak".to_string(),
                url: "https://example.org".to_string(),
                content: "barely related".to_string(),
                score: 0.3,
            }],
            fail: false,
        });
        let agent = MathAgentBuilder::new(llm, retriever)
            .with_search(search)
            .build();

        let state = agent.run("laplace transform table").await.unwrap();
        assert!(state.context.is_empty());
    }

    #[tokio::test]
    async fn test_no_search_client_goes_straight_to_final() {
        let llm = ScriptedLlm::new(vec!["I don't know.", "final answer"]);
        let agent = MathAgentBuilder::new(llm, retriever_with(&[])).build();

        let state = agent.run("collatz conjecture status").await.unwrap();
        assert_eq!(state.answer, "final answer");
    }

    #[tokio::test]
    async fn test_answer_applies_input_guard() {
        let llm = ScriptedLlm::new(vec![]);
        let agent = MathAgentBuilder::new(llm, retriever_with(&[])).build();

        let answer = agent.answer("tell me a story about pirates").await.unwrap();
        assert_eq!(answer, guardrails::OFF_TOPIC_MESSAGE);
    }

    #[tokio::test]
    async fn test_answer_applies_output_guard() {
        let llm = ScriptedLlm::new(vec!["first, hack into the grading server"]);
        let agent = MathAgentBuilder::new(llm, retriever_with(&[])).build();

        let answer = agent.answer("compute 2+2").await.unwrap();
        assert_eq!(answer, REFUSAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_answer_happy_path() {
        let llm = ScriptedLlm::new(vec!["x = 4"]);
        let agent = MathAgentBuilder::new(llm, retriever_with(&[])).build();

        let answer = agent.answer("solve 2x = 8").await.unwrap();
        assert_eq!(answer, "x = 4");
    }
}
