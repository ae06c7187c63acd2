//! One question-to-answer turn: route, execute, format.
//!
//! The model is called twice per turn. The first call picks a function
//! (re-prompted once if the reply is not a valid call), the second turns the
//! function's data into prose. [`Assistant::respond`] folds every failure into
//! the text shown to the user while keeping the error for the caller.

use serde_json::Value;
use tracing::{debug, warn};

use super::call_parser;
use super::error::FundchatError;
use super::function_call::FunctionCall;
use super::fund_data::FundData;
use super::prompt::{formatter_prompt, retry_prompt, router_prompt};
use crate::ports::model_port::ModelPort;

pub const NOT_FOUND_MESSAGE: &str =
    "Sorry, I cannot find the answer to your question in the database.";

pub const SETUP_INSTRUCTIONS: &str = "Error: the model service is not running!\n\n\
To fix this:\n\
1. Install Ollama from https://ollama.ai\n\
2. Run: ollama pull mistral\n\
3. Run: ollama serve\n\
4. Try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantOptions {
    /// Re-prompt once when the router reply is not a valid call.
    pub retry_invalid_call: bool,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            retry_invalid_call: true,
        }
    }
}

/// A successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub call: FunctionCall,
    pub data: Value,
    pub text: String,
}

/// What the user sees for a turn, plus how it was produced.
#[derive(Debug)]
pub struct Reply {
    pub text: String,
    pub answer: Option<Answer>,
    pub error: Option<FundchatError>,
}

impl Reply {
    fn answered(answer: Answer) -> Self {
        Self {
            text: answer.text.clone(),
            answer: Some(answer),
            error: None,
        }
    }

    fn failed(err: FundchatError) -> Self {
        Self {
            text: user_message(&err),
            answer: None,
            error: Some(err),
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// The text shown to the user for a failed turn.
pub fn user_message(err: &FundchatError) -> String {
    match err {
        FundchatError::ModelUnavailable { .. } => SETUP_INSTRUCTIONS.to_string(),
        FundchatError::ModelTimeout { .. } | FundchatError::ModelResponse { .. } => {
            format!("Error: {}", err)
        }
        _ => NOT_FOUND_MESSAGE.to_string(),
    }
}

pub struct Assistant<'a> {
    data: &'a FundData,
    model: &'a dyn ModelPort,
    options: AssistantOptions,
}

impl<'a> Assistant<'a> {
    pub fn new(data: &'a FundData, model: &'a dyn ModelPort, options: AssistantOptions) -> Self {
        Self {
            data,
            model,
            options,
        }
    }

    /// Ask the model which function answers the question.
    pub fn route(&self, question: &str) -> Result<FunctionCall, FundchatError> {
        let reply = self.model.generate(&router_prompt(question))?;
        debug!(reply = %reply, "router reply");

        match parse_call(&reply) {
            Err(err) if err.is_invalid_call() && self.options.retry_invalid_call => {
                warn!(error = %err, "rejected function call, asking again");
                let retry = retry_prompt(question, &reply, &err.to_string());
                let reply = self.model.generate(&retry)?;
                debug!(reply = %reply, "router retry reply");
                parse_call(&reply).inspect_err(|err| warn!(error = %err, "rejected function call"))
            }
            other => other,
        }
    }

    pub fn answer(&self, question: &str) -> Result<Answer, FundchatError> {
        let call = self.route(question)?;
        let data = call.run(self.data)?.to_json();
        let prompt = formatter_prompt(question, &data);
        debug!(prompt = %prompt, "formatter prompt");
        let text = self.model.generate(&prompt)?.trim().to_string();
        if text.is_empty() {
            return Err(FundchatError::EmptyAnswer);
        }

        Ok(Answer { call, data, text })
    }

    /// Run a full turn, starting with a reachability check.
    pub fn respond(&self, question: &str) -> Reply {
        if let Err(err) = self.model.check_available() {
            warn!(error = %err, "model service unavailable");
            return Reply::failed(err);
        }

        match self.answer(question) {
            Ok(answer) => Reply::answered(answer),
            Err(err) => {
                warn!(error = %err, "turn failed");
                Reply::failed(err)
            }
        }
    }
}

fn parse_call(reply: &str) -> Result<FunctionCall, FundchatError> {
    let raw = call_parser::parse(reply)?;
    FunctionCall::from_raw(&raw)
}
