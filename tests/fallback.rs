//! Primary-to-fallback model retry against a mock provider

use std::sync::Arc;
use std::time::Duration;

use companion_gateway::{
    AudioClip, ChatAdapter, Error, ModelRegistry, ProviderClient, SpeechOptions, SpeechToText,
    TextToSpeech, Tier,
};
use secrecy::SecretString;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{client_for, model_not_found_body, reply_body};

fn registry() -> Arc<ModelRegistry> {
    Arc::new(ModelRegistry::default())
}

fn model_response(model: &str, template: ResponseTemplate, hits: u64) -> Mock {
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(body_partial_json(serde_json::json!({ "model": model })))
        .respond_with(template)
        .expect(hits)
}

#[tokio::test]
async fn chat_retries_unknown_model_with_default_tier() {
    let server = MockServer::start().await;
    model_response(
        "gpt-4.1-nano",
        ResponseTemplate::new(404).set_body_json(model_not_found_body("gpt-4.1-nano")),
        1,
    )
    .mount(&server)
    .await;
    model_response(
        "gpt-4.1-mini",
        ResponseTemplate::new(200).set_body_json(reply_body("from fallback")),
        1,
    )
    .mount(&server)
    .await;

    let chat = ChatAdapter::new(client_for(&server), registry());
    let result = chat.run_chat("hello", Tier::Cheap).await.unwrap();

    assert_eq!(result.reply_text, "from fallback");
    assert_eq!(result.model, "gpt-4.1-mini");
}

#[tokio::test]
async fn chat_does_not_retry_when_fallback_is_primary() {
    let server = MockServer::start().await;
    model_response("gpt-4.1-mini", ResponseTemplate::new(404), 1)
        .mount(&server)
        .await;

    let chat = ChatAdapter::new(client_for(&server), registry());
    let err = chat.run_chat("hello", Tier::Default).await.unwrap_err();

    match err {
        Error::Upstream { model, status, .. } => {
            assert_eq!(model, "gpt-4.1-mini");
            assert_eq!(status, Some(404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn chat_server_error_is_not_retried() {
    let server = MockServer::start().await;
    model_response("gpt-4.1-nano", ResponseTemplate::new(500), 1)
        .mount(&server)
        .await;
    model_response(
        "gpt-4.1-mini",
        ResponseTemplate::new(200).set_body_json(reply_body("unused")),
        0,
    )
    .mount(&server)
    .await;

    let chat = ChatAdapter::new(client_for(&server), registry());
    let err = chat.run_chat("hello", Tier::Cheap).await.unwrap_err();

    assert!(matches!(err, Error::Upstream { status: Some(500), .. }));
}

#[tokio::test]
async fn chat_model_not_found_code_is_retried_regardless_of_status() {
    let server = MockServer::start().await;
    model_response(
        "gpt-4o",
        ResponseTemplate::new(403).set_body_json(model_not_found_body("gpt-4o")),
        1,
    )
    .mount(&server)
    .await;
    model_response(
        "gpt-4.1-mini",
        ResponseTemplate::new(200).set_body_json(reply_body("ok")),
        1,
    )
    .mount(&server)
    .await;

    let chat = ChatAdapter::new(client_for(&server), registry());
    let result = chat.run_chat("hello", Tier::OSeries).await.unwrap();

    assert_eq!(result.model, "gpt-4.1-mini");
}

#[tokio::test]
async fn chat_fallback_failure_surfaces_fallback_error() {
    let server = MockServer::start().await;
    model_response("gpt-4.1", ResponseTemplate::new(400), 1)
        .mount(&server)
        .await;
    model_response("gpt-4.1-mini", ResponseTemplate::new(503), 1)
        .mount(&server)
        .await;

    let chat = ChatAdapter::new(client_for(&server), registry());
    let err = chat.run_chat("hello", Tier::Quality).await.unwrap_err();

    assert_eq!(err.model(), Some("gpt-4.1-mini"));
    assert!(matches!(err, Error::Upstream { status: Some(503), .. }));
}

#[tokio::test]
async fn chat_sends_instructions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4.1-nano",
            "instructions": "be kind"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("kind reply")))
        .expect(1)
        .mount(&server)
        .await;

    let chat = ChatAdapter::new(client_for(&server), registry()).with_instructions("be kind");
    let result = chat.run_chat("hello", Tier::Cheap).await.unwrap();

    assert_eq!(result.reply_text, "kind reply");
}

#[tokio::test]
async fn chat_reply_without_text_is_invalid() {
    let server = MockServer::start().await;
    model_response(
        "gpt-4.1-nano",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"output": []})),
        1,
    )
    .mount(&server)
    .await;

    let chat = ChatAdapter::new(client_for(&server), registry());
    let err = chat.run_chat("hello", Tier::Cheap).await.unwrap_err();

    match err {
        Error::Upstream { code, status, .. } => {
            assert_eq!(code.as_deref(), Some("invalid_response"));
            assert_eq!(status, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn chat_transport_failure_is_not_retried() {
    // Nothing listens on the discard port
    let client = ProviderClient::new(
        SecretString::from("test-key".to_string()),
        "http://127.0.0.1:9",
        Duration::from_secs(2),
    )
    .unwrap();

    let chat = ChatAdapter::new(client, registry());
    let err = chat.run_chat("hello", Tier::Cheap).await.unwrap_err();

    match err {
        Error::Upstream { model, status, .. } => {
            assert_eq!(model, "gpt-4.1-nano");
            assert_eq!(status, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn stt_falls_back_to_whisper() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(body_string_contains("gpt-4o-transcribe"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(model_not_found_body("gpt-4o-transcribe")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(body_string_contains("whisper-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "בוקר טוב"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stt =
        SpeechToText::new(client_for(&server), registry()).with_language(Some("he".to_string()));
    let result = stt
        .speech_to_text(&AudioClip::new(vec![0u8; 64], "audio/wav"))
        .await
        .unwrap();

    assert_eq!(result.text, "בוקר טוב");
    assert_eq!(result.model, "whisper-1");
}

#[tokio::test]
async fn stt_empty_clip_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let stt = SpeechToText::new(client_for(&server), registry());
    let err = stt
        .speech_to_text(&AudioClip::new(Vec::<u8>::new(), "audio/wav"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(ref msg) if msg == "missing audio"));
}

#[tokio::test]
async fn tts_falls_back_on_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini-tts"})))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(body_partial_json(serde_json::json!({"model": "tts-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tts = TextToSpeech::new(client_for(&server), registry());
    let audio = tts
        .text_to_speech("שלום", &SpeechOptions::default())
        .await
        .unwrap();

    assert_eq!(audio.model, "tts-1");
    assert_eq!(&audio.bytes[..], b"mp3-bytes");
}

#[tokio::test]
async fn tts_without_fallback_makes_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let models = ModelRegistry::from_lookup(|key| (key == "OPENAI_TTS_FALLBACK").then(String::new));
    assert_eq!(models.tts.fallback, None);

    let tts = TextToSpeech::new(client_for(&server), Arc::new(models));
    let err = tts
        .text_to_speech("hi", &SpeechOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.model(), Some("gpt-4o-mini-tts"));
}

#[tokio::test]
async fn tts_empty_audio_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tts = TextToSpeech::new(client_for(&server), registry());
    let err = tts
        .text_to_speech("hi", &SpeechOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Upstream { ref code, .. } if code.as_deref() == Some("invalid_response")
    ));
}
