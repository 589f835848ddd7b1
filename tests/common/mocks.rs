use sqlgen_rust::{Error, Result, generation::SqlGenerator};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const DEFAULT_MOCK_SQL: &str = "SELECT * FROM users";

/// Mock generator: canned SQL per prompt, records every prompt it sees.
#[derive(Debug)]
pub struct MockSqlGenerator {
    pub responses: Arc<Mutex<HashMap<String, String>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub error: Option<String>,
}

impl MockSqlGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_response(self, prompt: &str, sql: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.to_string(), sql.to_string());
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl SqlGenerator for MockSqlGenerator {
    fn generate_sql(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(ref error) = self.error {
            return Err(Error::tokenizer(error.clone()));
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| DEFAULT_MOCK_SQL.to_string()))
    }
}

impl Default for MockSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}
