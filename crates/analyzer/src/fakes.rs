//! Scripted fakes for the capability traits
//!
//! Each fake pops pre-loaded results from a queue and appends a readable
//! entry to a shared call log, so tests can assert both outcomes and the
//! exact sequence of remote calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use remote::{
    BoxFuture, FileState, InferenceService, InferenceSession, RemoteError, RemoteFile, Result,
};

/// Shared, ordered record of every call made against the fakes.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn push(log: &CallLog, entry: String) {
    log.lock().unwrap().push(entry);
}

/// A remote file handle in the Processing state, as upload would return it.
pub fn processing_file() -> RemoteFile {
    RemoteFile {
        name: "files/fake-1".into(),
        uri: "https://fake.test/files/fake-1".into(),
        mime_type: "audio/mpeg".into(),
        state: FileState::Processing,
    }
}

/// Session whose every operation is scripted.
#[derive(Debug)]
pub struct ScriptedSession {
    pub log: CallLog,
    pub models: Mutex<VecDeque<Result<Vec<String>>>>,
    pub uploads: Mutex<VecDeque<Result<RemoteFile>>>,
    pub states: Mutex<VecDeque<Result<FileState>>>,
    pub invokes: Mutex<VecDeque<Result<String>>>,
    pub deletes: Mutex<VecDeque<Result<()>>>,
}

impl ScriptedSession {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            models: Mutex::new(VecDeque::new()),
            uploads: Mutex::new(VecDeque::new()),
            states: Mutex::new(VecDeque::new()),
            invokes: Mutex::new(VecDeque::new()),
            deletes: Mutex::new(VecDeque::new()),
        }
    }

    /// Happy-path session: upload settles immediately, invoke returns
    /// `text`, delete succeeds.
    pub fn ready(log: CallLog, text: &str) -> Self {
        let session = Self::new(log);
        session.uploads.lock().unwrap().push_back(Ok(RemoteFile {
            state: FileState::Active,
            ..processing_file()
        }));
        session
            .invokes
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        session.deletes.lock().unwrap().push_back(Ok(()));
        session
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T>>>, what: &str) -> Result<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("fake session: unscripted {what} call"))
    }
}

impl InferenceSession for ScriptedSession {
    fn list_models(&self) -> BoxFuture<'_, Result<Vec<String>>> {
        push(&self.log, "list_models".into());
        let result = Self::pop(&self.models, "list_models");
        Box::pin(async move { result })
    }

    fn upload_blob<'a>(
        &'a self,
        _bytes: Vec<u8>,
        display_name: &'a str,
        mime_type: &'a str,
    ) -> BoxFuture<'a, Result<RemoteFile>> {
        push(&self.log, format!("upload {display_name} {mime_type}"));
        let result = Self::pop(&self.uploads, "upload_blob");
        Box::pin(async move { result })
    }

    fn file_state<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<FileState>> {
        push(&self.log, format!("file_state {name}"));
        let result = Self::pop(&self.states, "file_state");
        Box::pin(async move { result })
    }

    fn invoke<'a>(
        &'a self,
        model: &'a str,
        file: &'a RemoteFile,
        _prompt: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        push(&self.log, format!("invoke {model} {}", file.name));
        let result = Self::pop(&self.invokes, "invoke");
        Box::pin(async move { result })
    }

    fn delete_blob<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        push(&self.log, format!("delete {name}"));
        let result = self
            .deletes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        Box::pin(async move { result })
    }
}

/// Service whose `connect` outcomes are scripted per call.
pub struct ScriptedService {
    pub log: CallLog,
    pub connects: Mutex<VecDeque<Result<Arc<dyn InferenceSession>>>>,
}

impl ScriptedService {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            connects: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_ok(&self, session: Arc<dyn InferenceSession>) {
        self.connects.lock().unwrap().push_back(Ok(session));
    }

    pub fn push_err(&self, message: &str) {
        self.connects
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::BadCredential(message.to_string())));
    }
}

impl InferenceService for ScriptedService {
    fn connect<'a>(
        &'a self,
        api_key: &'a str,
    ) -> BoxFuture<'a, Result<Arc<dyn InferenceSession>>> {
        push(&self.log, format!("connect {api_key}"));
        let result = self
            .connects
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("fake service: unscripted connect call"));
        Box::pin(async move { result })
    }
}
