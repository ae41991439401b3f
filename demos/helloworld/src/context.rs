//! Authentication for the demo.
//!
//! Writes need `?accesstoken=<token>` (or a bearer header) matching
//! `HELLOWORLD_ACCESS_TOKEN`. Without that variable every authenticated
//! route answers 401.

use kiln::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Environment variable holding the accepted token.
pub const TOKEN_VAR: &str = "HELLOWORLD_ACCESS_TOKEN";

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub token: String,
}

pub struct DemoContext {
    expected: Option<Arc<str>>,
    caller: Mutex<Option<String>>,
}

#[async_trait]
impl ApiContext for DemoContext {
    async fn authenticate(&self, request: &ApiRequest) -> Result<Option<Principal>, AuthError> {
        let Some(expected) = self.expected.as_deref() else {
            return Err(AuthError::backend("Auth is not implemented"));
        };

        let presented = request
            .query_values("accesstoken")
            .next()
            .or_else(|| {
                request
                    .header("authorization")
                    .and_then(|v| v.strip_prefix("Bearer "))
            });

        match presented {
            None => Ok(None),
            Some(token) if token == expected => {
                *self.caller.lock() = Some(token.to_string());
                Ok(Some(Principal::new(Caller {
                    token: token.to_string(),
                })))
            }
            Some(_) => Err(AuthError::invalid("unknown token")),
        }
    }

    fn log_summary(&self) {
        tracing::debug!(authenticated = self.caller.lock().is_some(), "request summary");
    }
}

/// Builds the context factory. `None` rejects every authenticated request.
pub fn factory(token: Option<String>) -> SharedContextFactory {
    let expected: Option<Arc<str>> = token.filter(|t| !t.is_empty()).map(Arc::from);
    Arc::new(move || {
        Box::new(DemoContext {
            expected: expected.clone(),
            caller: Mutex::new(None),
        }) as Box<dyn ApiContext>
    })
}
