//! AI chat assistant: grounds a librarian prompt in the catalog, then proxies
//! a streaming completion from an OpenAI-compatible upstream.

use futures::{stream, Stream, StreamExt};
use regex::Regex;
use serde_json::{json, Value};

use crate::{
    config::ChatConfig,
    error::{AppError, AppResult},
    models::Book,
    repository::Repository,
};

/// How many catalog matches are quoted into the prompt
const CONTEXT_BOOKS: i64 = 5;

/// One parsed line of the upstream SSE body
#[derive(Debug, PartialEq)]
enum SseChunk {
    Token(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseChunk {
    let Some(payload) = line.strip_prefix("data:").map(str::trim) else {
        return SseChunk::Skip;
    };
    if payload == "[DONE]" {
        return SseChunk::Done;
    }
    let Ok(value) = serde_json::from_str::<Value>(payload) else {
        return SseChunk::Skip;
    };
    match value["choices"][0]["delta"]["content"].as_str() {
        Some(token) if !token.is_empty() => SseChunk::Token(token.to_string()),
        _ => SseChunk::Skip,
    }
}

/// Pull a `《title》` out of the message, if the user quoted one
fn extract_book_title<'a>(pattern: &Regex, message: &'a str) -> Option<&'a str> {
    pattern
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn build_prompt(message: &str, books: &[Book]) -> String {
    let context = if books.is_empty() {
        "No matching books in the catalog.".to_string()
    } else {
        books
            .iter()
            .map(|b| format!("Title: {}, Author: {}", b.name, b.author))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are a librarian assistant.\n\
         Books currently in the catalog:\n{context}\n\
         The patron asks: {message}\n\
         Answer based on the catalog above. If the catalog has no answer, \
         say you could not find the information. Do not invent books.",
    )
}

#[derive(Clone)]
pub struct ChatService {
    repository: Repository,
    config: ChatConfig,
    client: reqwest::Client,
    title_pattern: Regex,
}

impl ChatService {
    pub fn new(repository: Repository, config: ChatConfig) -> Self {
        Self {
            repository,
            config,
            client: reqwest::Client::new(),
            title_pattern: Regex::new("《(.+?)》").expect("valid title pattern"),
        }
    }

    /// Answer a patron question as a token stream.
    ///
    /// The upstream call is the only outbound I/O in the system; a failure
    /// there never touches any persistent state.
    pub async fn ask_stream(
        &self,
        message: &str,
    ) -> AppResult<impl Stream<Item = AppResult<String>>> {
        let keyword = extract_book_title(&self.title_pattern, message).unwrap_or(message);
        let books = self
            .repository
            .books
            .search_by_keyword(keyword, CONTEXT_BOOKS)
            .await?;
        let prompt = build_prompt(message, &books);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "model": self.config.model,
                "stream": true,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("chat upstream request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "chat upstream returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes_stream();
        let tokens = stream::unfold(
            (bytes, String::new(), false),
            |(mut bytes, mut buf, done)| async move {
                if done {
                    return None;
                }
                loop {
                    if let Some(pos) = buf.find('\n') {
                        let line: String = buf.drain(..=pos).collect();
                        match parse_sse_line(line.trim_end()) {
                            SseChunk::Token(token) => {
                                return Some((Ok(token), (bytes, buf, false)))
                            }
                            SseChunk::Done => return None,
                            SseChunk::Skip => continue,
                        }
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => buf.push_str(&String::from_utf8_lossy(&chunk)),
                        Some(Err(e)) => {
                            let err =
                                AppError::Internal(format!("chat upstream stream failed: {}", e));
                            return Some((Err(err), (bytes, buf, true)));
                        }
                        None => return None,
                    }
                }
            },
        );

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_line_with_content_yields_token() {
        let line = r#"data: {"choices":[{"delta":{"content":"hello"}}]}"#;
        assert_eq!(parse_sse_line(line), SseChunk::Token("hello".to_string()));
    }

    #[test]
    fn sse_done_marker_terminates() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseChunk::Done);
    }

    #[test]
    fn non_data_lines_are_skipped() {
        assert_eq!(parse_sse_line(": keep-alive"), SseChunk::Skip);
        assert_eq!(parse_sse_line(""), SseChunk::Skip);
        assert_eq!(parse_sse_line("data: {\"choices\":[]}"), SseChunk::Skip);
    }

    #[test]
    fn quoted_title_is_extracted() {
        let pattern = Regex::new("《(.+?)》").unwrap();
        assert_eq!(
            extract_book_title(&pattern, "do you have 《Dune》 in stock?"),
            Some("Dune")
        );
        assert_eq!(extract_book_title(&pattern, "any sci-fi books?"), None);
    }
}
