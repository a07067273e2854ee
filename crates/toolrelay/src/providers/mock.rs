use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::reply::ModelReply;
use crate::models::tool::ToolDeclaration;
use crate::providers::base::Provider;

/// A request seen by the mock provider
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDeclaration>>,
}

/// A mock provider that returns pre-configured replies and records every request
#[derive(Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<Vec<Result<ModelReply, ProviderError>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockProvider {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<Result<ModelReply, ProviderError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn send(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDeclaration]>,
    ) -> Result<ModelReply, ProviderError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tools: tools.map(<[ToolDeclaration]>::to_vec),
        });

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            // Return empty reply if no more pre-configured replies
            Ok(ModelReply::text(""))
        } else {
            replies.remove(0)
        }
    }
}
