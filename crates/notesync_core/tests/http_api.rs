use notesync_core::{
    ApiError, AuthApi, Failure, HttpApi, LoginForm, NoteDraft, NoteStatus, NotesApi, Session,
};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Request captured by the one-shot server.
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves exactly one request with `status` and `body`, then exits.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .map(|(_, value)| value.parse::<usize>().unwrap())
            .unwrap_or(0);
        let mut raw_body = vec![0; length];
        reader.read_exact(&mut raw_body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(raw_body).unwrap(),
        }
    });

    (base_url, handle)
}

#[test]
fn list_sends_bearer_token_and_decodes_envelope() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"notes":[{"_id":"abc","title":"t","description":"d","tags":"a, b","dueDate":"2030-01-02T03:04:00.000Z","status":"in-progress"}]}"#,
    );
    let api = HttpApi::new(format!("{base_url}/")).unwrap();

    let notes = api.list_notes(&Session::with_token("tok-1")).unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "GET /notes/task HTTP/1.1");
    assert_eq!(captured.header("authorization"), Some("Bearer tok-1"));
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, "abc");
    assert_eq!(notes[0].status, NoteStatus::InProgress);
    assert_eq!(notes[0].tag_list(), vec!["a", "b"]);
    assert!(notes[0].due_date.is_some());
}

#[test]
fn list_keeps_notes_with_null_tags() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"notes":[{"_id":"a","title":"t","description":"d","tags":null},{"_id":"b","title":"u","description":"e","tags":"x"}]}"#,
    );
    let api = HttpApi::new(base_url).unwrap();

    let notes = api.list_notes(&Session::with_token("tok")).unwrap();
    server.join().unwrap();

    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].tags, "");
    assert_eq!(notes[1].tag_list(), vec!["x"]);
}

#[test]
fn list_without_notes_key_is_empty() {
    let (base_url, server) = serve_once("200 OK", "{}");
    let api = HttpApi::new(base_url).unwrap();

    let notes = api.list_notes(&Session::anonymous()).unwrap();
    let captured = server.join().unwrap();

    assert!(notes.is_empty());
    assert_eq!(captured.header("authorization"), None);
}

#[test]
fn delete_targets_note_path() {
    let (base_url, server) = serve_once("200 OK", "{}");
    let api = HttpApi::new(base_url).unwrap();

    api.delete_note(&Session::with_token("tok"), &"abc".to_string())
        .unwrap();
    let captured = server.join().unwrap();
    assert_eq!(captured.request_line, "DELETE /notes/task/abc HTTP/1.1");
}

#[test]
fn reserved_characters_in_id_stay_in_one_segment() {
    let (base_url, server) = serve_once("200 OK", "{}");
    let api = HttpApi::new(base_url).unwrap();

    api.delete_note(&Session::with_token("tok"), &"a/b?x=1".to_string())
        .unwrap();
    let captured = server.join().unwrap();
    assert_eq!(captured.request_line, "DELETE /notes/task/a%2Fb%3Fx=1 HTTP/1.1");
}

#[test]
fn update_sends_camel_case_payload() {
    let (base_url, server) = serve_once("200 OK", r#"{"message":"updated"}"#);
    let api = HttpApi::new(base_url).unwrap();

    let mut draft = NoteDraft::new("title", "body");
    draft.due_date = "2030-01-02T03:04".to_string();
    draft.status = NoteStatus::Completed;
    let payload = draft.validate().unwrap();

    api.update_note(&Session::with_token("tok"), &"abc".to_string(), &payload)
        .unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "PATCH /notes/task/abc HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(sent["title"], "title");
    assert_eq!(sent["status"], "completed");
    assert_eq!(sent["dueDate"], "2030-01-02T03:04:00.000Z");
}

#[test]
fn create_decodes_created_note() {
    let (base_url, server) = serve_once(
        "201 Created",
        r#"{"note":{"_id":"n1","title":"title","description":"body"}}"#,
    );
    let api = HttpApi::new(base_url).unwrap();

    let payload = NoteDraft::new("title", "body").validate().unwrap();
    let created = api.create_note(&Session::with_token("tok"), &payload).unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "POST /notes/task HTTP/1.1");
    assert_eq!(created.id, "n1");
    assert_eq!(created.status, NoteStatus::Pending);
}

#[test]
fn rejected_response_carries_error_body() {
    let (base_url, server) = serve_once(
        "422 Unprocessable Entity",
        r#"{"errors":[{"path":"email","msg":"Taken"}]}"#,
    );
    let api = HttpApi::new(base_url).unwrap();

    let err = api
        .login(&LoginForm::new("ada@example.com", "secret"))
        .unwrap_err();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "POST /auth/login HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(sent["email"], "ada@example.com");

    let ApiError::Rejected { status, .. } = &err else {
        panic!("expected rejection, got {err:?}");
    };
    assert_eq!(*status, 422);
    let failure = Failure::from_api_error(&err, "fallback");
    assert_eq!(
        failure.field_errors().unwrap().get("email").unwrap(),
        &["Taken".to_string()]
    );
}

#[test]
fn non_json_rejection_falls_back() {
    let (base_url, server) = serve_once("502 Bad Gateway", "<html>oops</html>");
    let api = HttpApi::new(base_url).unwrap();

    let err = api.list_notes(&Session::anonymous()).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, ApiError::Rejected { status: 502, body: None }));
    assert_eq!(
        Failure::from_api_error(&err, "Failed to fetch notes."),
        Failure::Message("Failed to fetch notes.".to_string())
    );
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let api = HttpApi::new(base_url).unwrap();
    let err = api.list_notes(&Session::anonymous()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
