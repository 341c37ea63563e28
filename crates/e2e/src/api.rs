//! Web-service API driver
//!
//! Creates and destroys fixtures over HTTP, recording each change in the
//! mental model, and reads collections back for matchers.

use indexmap::IndexMap;
use lockstep_common::{MentalModel, Value};
use reqwest::blocking::{Client, Response};
use reqwest::Method;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::error::{E2eError, E2eResult};
use crate::observe::Observe;

/// Field of a stored fixture that names it in resource URLs
const ID_FIELD: &str = "id";

/// HTTP client bound to one application under test
pub struct ApiDriver {
    client: Client,
    base_url: String,
    routes: IndexMap<String, String>,
}

impl ApiDriver {
    pub fn new(config: &ApiConfig) -> E2eResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            routes: config.routes.clone(),
        })
    }

    /// Serve `collection` from `path` (relative to the base URL)
    pub fn route(mut self, collection: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(collection.into(), path.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET the collection's route and decode a JSON array of items
    pub fn fetch(&self, collection: &str) -> E2eResult<Vec<Value>> {
        let url = self.collection_url(collection)?;
        let response = self.send(Method::GET, &url, None)?;
        let items: Vec<serde_json::Value> = response.json()?;

        debug!(collection, count = items.len(), "Fetched collection");
        Ok(items.into_iter().map(Value::from).collect())
    }

    /// POST `body` to the collection's route and record the created resource under `key`
    pub fn create(
        &self,
        model: &mut MentalModel,
        collection: &str,
        key: &str,
        body: &Value,
    ) -> E2eResult<Value> {
        let url = self.collection_url(collection)?;
        let response = self.send(Method::POST, &url, Some(body))?;
        let created = Value::from(response.json::<serde_json::Value>()?);

        info!(collection, key, "Created fixture");
        model.collection(collection).set(key, created.clone());
        Ok(created)
    }

    /// DELETE the resource recorded under `key` and mark it deleted in the model.
    ///
    /// The key is looked up before any request is made, so an unknown key
    /// fails without touching the application.
    pub fn destroy(&self, model: &mut MentalModel, collection: &str, key: &str) -> E2eResult<Value> {
        let stored = model.collection(collection).get(key)?;
        let id = match stored.get(ID_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Int(n)) => n.to_string(),
            _ => {
                return Err(E2eError::MissingField {
                    collection: collection.to_string(),
                    key: key.to_string(),
                    field: ID_FIELD.to_string(),
                })
            }
        };

        let url = format!("{}/{}", self.collection_url(collection)?, id);
        self.send(Method::DELETE, &url, None)?;

        info!(collection, key, "Destroyed fixture");
        Ok(model.collection(collection).delete(key)?)
    }

    fn collection_url(&self, collection: &str) -> E2eResult<String> {
        let path = self.routes.get(collection).ok_or_else(|| {
            E2eError::Configuration(format!("no API route for collection `{}`", collection))
        })?;
        Ok(format!("{}/{}", self.base_url, path.trim_start_matches('/')))
    }

    fn send(&self, method: Method, url: &str, body: Option<&Value>) -> E2eResult<Response> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(E2eError::Api {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Observe for ApiDriver {
    fn exposes(&self, accessor: &str) -> bool {
        self.routes.contains_key(accessor)
    }

    fn observe(&mut self, accessor: &str) -> E2eResult<Vec<Value>> {
        self.fetch(accessor)
    }
}
