use super::{ChatMessage, ChatRequest, ChatResponse, LlmError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

fn build_request(request: &ChatRequest) -> OpenAiRequest<'_> {
    OpenAiRequest {
        model: &request.model,
        messages: &request.messages,
        max_tokens: request.max_tokens,
    }
}

fn parse_response(data: OpenAiResponse, model: &str) -> Result<ChatResponse, LlmError> {
    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parse("response contained no choices".into()))?;

    Ok(ChatResponse {
        content: choice.message.content.unwrap_or_default().trim().to_string(),
        model: model.to_string(),
    })
}

pub async fn chat(config: &OpenAiConfig, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
    let client = Client::new();
    let body = build_request(request);

    let mut req = client
        .post(format!("{}/chat/completions", config.base_url))
        .header("Content-Type", "application/json")
        .json(&body);

    if !config.api_key.is_empty() {
        req = req.header("Authorization", format!("Bearer {}", config.api_key));
    }

    let resp = req.send().await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        return Err(LlmError::Api {
            status,
            message: text,
        });
    }

    let data: OpenAiResponse = resp.json().await?;
    parse_response(data, &request.model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("hi"),
            ],
            model: "llama-3.3-70b-versatile".into(),
            max_tokens: None,
        };
        let json = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_max_tokens_forwarded() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            model: "m".into(),
            max_tokens: Some(150),
        };
        let json = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(json["max_tokens"], 150);
    }

    #[test]
    fn test_first_choice_is_trimmed() {
        let data: OpenAiResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  short summary \n"}},
                           {"message":{"role":"assistant","content":"ignored"}}]}"#,
        )
        .unwrap();
        let resp = parse_response(data, "m").unwrap();
        assert_eq!(resp.content, "short summary");
    }

    #[test]
    fn test_empty_choices_is_parse_error() {
        let data: OpenAiResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = parse_response(data, "m").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
