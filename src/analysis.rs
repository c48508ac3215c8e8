use crate::gemini::ServiceError;
use crate::models::ViolationRecord;

/// Environment variable holding the Gemini API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const MISSING_KEY_MESSAGE: &str = "Error: The Gemini API key is not configured. \
    Set the GEMINI_API_KEY environment variable and try again.";

pub const NO_DATA_MESSAGE: &str = "There is no violation data to analyze.";

pub const INVALID_KEY_MESSAGE: &str = "Sorry, something went wrong: the API key was \
    rejected by the AI service. Check the GEMINI_API_KEY value and try again.";

pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, something went wrong while analyzing \
    the data. There may be a problem reaching the AI service. Please try again later.";

/// External generative capability: one prompt in, one text response out.
pub trait GenerateText {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ServiceError>;
}

impl<G: GenerateText> GenerateText for &G {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ServiceError> {
        (*self).generate(api_key, prompt).await
    }
}

/// Runs the analysis request and funnels every outcome, success or failure,
/// into a single displayable string. One-shot: no retry, no timeout of its
/// own, never panics past this boundary.
pub struct Analyzer<G> {
    credential: Option<String>,
    client: G,
}

impl<G: GenerateText> Analyzer<G> {
    pub fn new(credential: Option<String>, client: G) -> Self {
        Self { credential, client }
    }

    pub fn from_env(client: G) -> Self {
        let credential = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(credential, client)
    }

    pub async fn analyze(&self, records: &[ViolationRecord]) -> String {
        let Some(key) = &self.credential else {
            return MISSING_KEY_MESSAGE.to_string();
        };
        if records.is_empty() {
            return NO_DATA_MESSAGE.to_string();
        }

        let prompt = match build_prompt(records) {
            Ok(prompt) => prompt,
            Err(_) => return GENERIC_FAILURE_MESSAGE.to_string(),
        };

        match self.client.generate(key, &prompt).await {
            Ok(text) => text,
            Err(ServiceError::InvalidCredential(_)) => INVALID_KEY_MESSAGE.to_string(),
            Err(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Fixed instructional template plus the full record list as pretty JSON,
/// asking for a markdown answer in five named sections.
pub fn build_prompt(records: &[ViolationRecord]) -> serde_json::Result<String> {
    let data = serde_json::to_string_pretty(records)?;
    Ok(format!(
        "You are an assistant to a school principal with expertise in analyzing \
student discipline data.\n\
Based on the following uniform and attribute violation data, provide an \
in-depth analysis.\n\n\
Violation data:\n{data}\n\n\
Your tasks:\n\
1.  **Executive Summary:** Give a short summary of the overall violation trends.\n\
2.  **Most Common Violations:** Identify the 3 most frequent violation types and count them.\n\
3.  **Trends by Class:** Do any classes or grade levels show more violations? If so, name them.\n\
4.  **Analysis by Gender:** Are there violation trends specific to one gender \
(for example, 'Long Hair' applying only to boys)? Analyze this.\n\
5.  **Recommended Actions:** Give 3 concrete, practical recommendations the school \
(duty teachers, student affairs, or homeroom teachers) can take to reduce these \
violations going forward.\n\n\
Format your output as clear, well-structured Markdown."
    ))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Gender, ViolationType};
    use crate::store::seed_records;

    enum Script {
        Succeed(&'static str),
        RejectKey,
        Fail,
    }

    struct ScriptedClient {
        calls: RefCell<usize>,
        script: Script,
    }

    impl ScriptedClient {
        fn new(script: Script) -> Self {
            Self {
                calls: RefCell::new(0),
                script,
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl GenerateText for ScriptedClient {
        async fn generate(&self, _key: &str, _prompt: &str) -> Result<String, ServiceError> {
            *self.calls.borrow_mut() += 1;
            match &self.script {
                Script::Succeed(text) => Ok(text.to_string()),
                Script::RejectKey => Err(ServiceError::InvalidCredential(
                    "API key not valid".to_string(),
                )),
                Script::Fail => Err(ServiceError::Unavailable("connection refused".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_without_a_call() {
        let client = ScriptedClient::new(Script::Succeed("unused"));
        let analyzer = Analyzer::new(None, &client);
        let result = analyzer.analyze(&seed_records()).await;
        assert_eq!(result, MISSING_KEY_MESSAGE);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_records_short_circuit_without_a_call() {
        let client = ScriptedClient::new(Script::Succeed("unused"));
        let analyzer = Analyzer::new(Some("key".to_string()), &client);
        let result = analyzer.analyze(&[]).await;
        assert_eq!(result, NO_DATA_MESSAGE);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn success_returns_service_text_verbatim_after_one_call() {
        let client = ScriptedClient::new(Script::Succeed("## Executive Summary\nCalm month."));
        let analyzer = Analyzer::new(Some("key".to_string()), &client);
        let result = analyzer.analyze(&seed_records()).await;
        assert_eq!(result, "## Executive Summary\nCalm month.");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn rejected_key_maps_to_the_credential_message() {
        let client = ScriptedClient::new(Script::RejectKey);
        let analyzer = Analyzer::new(Some("bad-key".to_string()), &client);
        let result = analyzer.analyze(&seed_records()).await;
        assert_eq!(result, INVALID_KEY_MESSAGE);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn other_failures_map_to_the_retry_message() {
        let client = ScriptedClient::new(Script::Fail);
        let analyzer = Analyzer::new(Some("key".to_string()), &client);
        let result = analyzer.analyze(&seed_records()).await;
        assert_eq!(result, GENERIC_FAILURE_MESSAGE);
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn prompt_embeds_records_and_section_headings() {
        let records = vec![ViolationRecord {
            id: "seed-1".to_string(),
            student_name: "Budi Santoso".to_string(),
            student_class: "XII IPA 1".to_string(),
            gender: Gender::Male,
            date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            violations: vec![ViolationType::NoHat],
            notes: None,
        }];
        let prompt = build_prompt(&records).unwrap();
        assert!(prompt.contains("Budi Santoso"));
        assert!(prompt.contains("No Hat"));
        assert!(prompt.contains("Executive Summary"));
        assert!(prompt.contains("Recommended Actions"));
    }
}
