//! Rollbar REST client.
//!
//! Each operation is a single synchronous round trip: build the request,
//! send it through the [`Transport`], decode the envelope, normalize
//! `result`. Nothing is cached or retried.

use std::time::{Duration, Instant};

use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::envelope::{self, Decoded};
use super::normalize::{normalize_instance, normalize_item, unwrap_item_result};
use super::transport::{ACCESS_TOKEN_HEADER, HttpRequest, HttpTransport, Method, Transport};
use crate::error::{Result, RollbarError};
use crate::model::types::{
    GetItemResponse, ListItemInstancesResponse, ListItemsOptions, ListItemsResponse,
    UpdateItemResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://api.rollbar.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for [`RollbarClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub access_token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct RollbarClient<T = HttpTransport> {
    access_token: String,
    base_url: String,
    transport: T,
}

impl RollbarClient<HttpTransport> {
    /// Client backed by a blocking HTTP transport. An empty base URL or a
    /// zero timeout falls back to the defaults.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let timeout = if config.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            config.timeout
        };
        Ok(Self::with_transport(config, HttpTransport::new(timeout)?))
    }
}

impl<T: Transport> RollbarClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        let base_url = config.base_url.trim().trim_end_matches('/');
        let base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        Self {
            access_token: config.access_token.clone(),
            base_url: base_url.to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/1/items`, one page.
    pub fn list_items(&self, opts: &ListItemsOptions) -> Result<ListItemsResponse> {
        self.require_token()?;

        let mut query: Vec<(&str, String)> = Vec::new();
        if opts.page > 0 {
            query.push(("page", opts.page.to_string()));
        }
        if let Some(status) = opts.status.as_deref().filter(|s| !s.is_empty()) {
            query.push(("status", status.to_string()));
        }
        if let Some(env) = opts.environment.as_deref().filter(|s| !s.is_empty()) {
            query.push(("environment", env.to_string()));
        }
        for level in &opts.levels {
            let level = level.trim();
            if !level.is_empty() {
                query.push(("level", level.to_string()));
            }
        }

        let url = self.endpoint(&["items"], &query)?;
        let Decoded { result, raw } = self.execute(Method::Get, url, None)?;

        let items = match &result {
            Value::Null => Vec::new(),
            Value::Object(obj) => match obj.get("items") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items.iter().map(normalize_item).collect(),
                Some(other) => {
                    return Err(RollbarError::MalformedResponse(format!(
                        "parse result.items: expected an array, got {}",
                        json_kind(other)
                    )));
                }
            },
            other => {
                return Err(RollbarError::MalformedResponse(format!(
                    "parse result.items: expected an object, got {}",
                    json_kind(other)
                )));
            }
        };

        debug!(count = items.len(), "listed items");
        Ok(ListItemsResponse { items, raw })
    }

    pub fn get_item_by_id(&self, id: i64) -> Result<GetItemResponse> {
        if id <= 0 {
            return Err(RollbarError::validation("invalid item id: must be > 0"));
        }
        self.get_item(&id.to_string())
    }

    pub fn get_item_by_uuid(&self, uuid: &str) -> Result<GetItemResponse> {
        let uuid = uuid.trim();
        if uuid.is_empty() {
            return Err(RollbarError::validation("invalid UUID: must not be empty"));
        }
        self.get_item(uuid)
    }

    /// `GET /api/1/item/{identifier}/instances`. `identifier` may be a
    /// numeric id or a UUID.
    pub fn list_item_instances(
        &self,
        identifier: &str,
        page: i64,
    ) -> Result<ListItemInstancesResponse> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(RollbarError::validation(
                "invalid item identifier: must not be empty",
            ));
        }
        self.require_token()?;

        let mut query = Vec::new();
        if page > 0 {
            query.push(("page", page.to_string()));
        }
        let url = self.endpoint(&["item", identifier, "instances"], &query)?;
        let Decoded { result, raw } = self.execute(Method::Get, url, None)?;

        let instances: Vec<_> = instance_values(&result)
            .iter()
            .map(normalize_instance)
            .collect();
        debug!(count = instances.len(), "listed item instances");
        Ok(ListItemInstancesResponse { instances, raw })
    }

    /// `PATCH /api/1/item/{id}` with a sparse body. `null` values are sent
    /// as `null`; absent keys are left untouched by the service.
    pub fn update_item_by_id(
        &self,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<UpdateItemResponse> {
        if id <= 0 {
            return Err(RollbarError::validation("invalid item id: must be > 0"));
        }
        if fields.is_empty() {
            return Err(RollbarError::validation("missing update fields"));
        }
        self.require_token()?;

        let body = serde_json::to_vec(fields)
            .map_err(|e| RollbarError::validation(format!("marshal request body: {e}")))?;
        let url = self.endpoint(&["item", &id.to_string()], &[])?;
        let Decoded { result, raw } = self.execute(Method::Patch, url, Some(body))?;

        let item = normalize_item(unwrap_item_result(object_or_null(&result, "parse result")?));
        Ok(UpdateItemResponse { item, raw })
    }

    fn get_item(&self, identifier: &str) -> Result<GetItemResponse> {
        self.require_token()?;

        let url = self.endpoint(&["item", identifier], &[])?;
        let Decoded { result, raw } = self.execute(Method::Get, url, None)?;

        let item = normalize_item(unwrap_item_result(object_or_null(
            &result,
            "parse item result",
        )?));
        Ok(GetItemResponse { item, raw })
    }

    fn require_token(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(RollbarError::Auth);
        }
        Ok(())
    }

    /// `{base}/api/1/{segments...}?{query}`, each segment percent-escaped.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s))
            .collect::<Vec<_>>()
            .join("/");
        let mut url = Url::parse(&format!("{}/api/1/{path}", self.base_url))
            .map_err(|e| RollbarError::validation(format!("build request URL: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn execute(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Decoded> {
        let mut headers = vec![
            (ACCESS_TOKEN_HEADER, self.access_token.clone()),
            ("Accept", "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        };

        debug!(method = method.as_str(), url = %request.url, "sending request");
        let started = Instant::now();
        let response = self.transport.send(&request)?;
        debug!(
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );

        envelope::decode(response.status, &response.body)
    }
}

/// Instances arrive either as `{"instances": [...]}` or as a bare array.
/// Anything else reads as no instances.
fn instance_values(result: &Value) -> &[Value] {
    let wrapped = result
        .get("instances")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if !wrapped.is_empty() {
        return wrapped;
    }
    match result {
        Value::Array(direct) => direct.as_slice(),
        Value::Null => &[],
        Value::Object(obj) if obj.contains_key("instances") => &[],
        other => {
            warn!(
                kind = json_kind(other),
                "instances result matched neither shape; treating as empty"
            );
            &[]
        }
    }
}

fn object_or_null<'a>(result: &'a Value, context: &str) -> Result<&'a Value> {
    match result {
        Value::Object(_) | Value::Null => Ok(result),
        other => Err(RollbarError::MalformedResponse(format!(
            "{context}: expected an object, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::HttpResponse;
    use serde_json::json;
    use std::cell::RefCell;

    /// Replays one canned response and records every request.
    struct StubTransport {
        status: u16,
        body: String,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn ok(body: Value) -> Self {
            Self::new(200, &body.to_string())
        }

        fn last(&self) -> HttpRequest {
            self.requests
                .borrow()
                .last()
                .cloned()
                .expect("a request was sent")
        }

        fn sent(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl Transport for &StubTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.requests.borrow_mut().push(request.clone());
            Ok(HttpResponse {
                status: self.status,
                body: self.body.clone().into_bytes(),
            })
        }
    }

    fn client(stub: &StubTransport) -> RollbarClient<&StubTransport> {
        RollbarClient::with_transport(
            &ClientConfig {
                access_token: "tok".into(),
                base_url: "https://rollbar.test/".into(),
                timeout: Duration::from_secs(2),
            },
            stub,
        )
    }

    fn query_values(url: &str, key: &str) -> Vec<String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    #[test]
    fn defaults_apply_to_blank_config() {
        let stub = StubTransport::ok(json!({"err": 0}));
        let c = RollbarClient::with_transport(&ClientConfig::default(), &stub);
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);
        assert_eq!(ClientConfig::default().timeout, Duration::from_secs(15));
    }

    #[test]
    fn list_items_sends_filters_and_normalizes() {
        let stub = StubTransport::ok(json!({
            "err": 0,
            "result": {"items": [{
                "id": 123,
                "counter": 10,
                "status": "active",
                "last_occurrence": {
                    "body": {"trace": {"exception": {"message": "panic happened"}}},
                    "level": "error",
                    "environment": "production",
                    "timestamp": 1700000000
                }
            }]}
        }));
        let resp = client(&stub)
            .list_items(&ListItemsOptions {
                page: 2,
                status: Some("active".into()),
                environment: Some("production".into()),
                levels: vec!["error".into(), " ".into(), " critical ".into()],
            })
            .unwrap();

        let req = stub.last();
        assert_eq!(req.method, Method::Get);
        let url = Url::parse(&req.url).unwrap();
        assert_eq!(url.path(), "/api/1/items");
        assert_eq!(query_values(&req.url, "page"), ["2"]);
        assert_eq!(query_values(&req.url, "status"), ["active"]);
        assert_eq!(query_values(&req.url, "environment"), ["production"]);
        assert_eq!(query_values(&req.url, "level"), ["error", "critical"]);
        assert_eq!(req.header("X-Rollbar-Access-Token"), Some("tok"));
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.body.is_none());

        assert_eq!(resp.items.len(), 1);
        let item = &resp.items[0];
        assert_eq!((item.id, item.counter), (123, 10));
        assert_eq!(item.title, "panic happened");
        assert_eq!(item.level, "error");
        assert_eq!(item.environment, "production");
        assert_eq!(item.last_occurrence_timestamp, 1700000000);
        assert_eq!(resp.raw["err"], 0);
    }

    #[test]
    fn list_items_omits_unset_filters() {
        let stub = StubTransport::ok(json!({"err": 0, "result": {"items": []}}));
        let resp = client(&stub)
            .list_items(&ListItemsOptions {
                page: 0,
                ..Default::default()
            })
            .unwrap();
        assert!(resp.items.is_empty());
        assert_eq!(Url::parse(&stub.last().url).unwrap().query(), None);
    }

    #[test]
    fn list_items_rejects_non_array_items() {
        let stub = StubTransport::ok(json!({"err": 0, "result": {"items": "nope"}}));
        let err = client(&stub)
            .list_items(&ListItemsOptions::default())
            .unwrap_err();
        assert!(matches!(err, RollbarError::MalformedResponse(_)));
    }

    #[test]
    fn operations_require_token() {
        let stub = StubTransport::ok(json!({"err": 0}));
        let c = RollbarClient::with_transport(&ClientConfig::default(), &stub);
        assert!(matches!(
            c.list_items(&ListItemsOptions::default()),
            Err(RollbarError::Auth)
        ));
        assert!(matches!(c.get_item_by_id(1), Err(RollbarError::Auth)));
        assert!(matches!(c.get_item_by_uuid("u"), Err(RollbarError::Auth)));
        assert!(matches!(
            c.list_item_instances("1", 0),
            Err(RollbarError::Auth)
        ));
        let mut fields = Map::new();
        fields.insert("status".into(), json!("resolved"));
        assert!(matches!(
            c.update_item_by_id(1, &fields),
            Err(RollbarError::Auth)
        ));
        assert_eq!(stub.sent(), 0);
    }

    #[test]
    fn get_item_by_id_and_uuid_share_endpoint() {
        let stub = StubTransport::ok(json!({
            "err": 0,
            "result": {"id": 555, "counter": 42, "title": "Null pointer", "level": "error"}
        }));
        let c = client(&stub);

        let resp = c.get_item_by_id(555).unwrap();
        assert_eq!(Url::parse(&stub.last().url).unwrap().path(), "/api/1/item/555");
        assert_eq!(resp.item.id, 555);
        assert_eq!(resp.item.title, "Null pointer");

        c.get_item_by_uuid(" a/b c ").unwrap();
        assert_eq!(
            Url::parse(&stub.last().url).unwrap().path(),
            "/api/1/item/a%2Fb%20c"
        );
    }

    #[test]
    fn get_item_unwraps_nested_item() {
        let stub = StubTransport::ok(json!({"err": 0, "result": {"item": {"id": 7, "title": "t"}}}));
        let resp = client(&stub).get_item_by_uuid("uuid-1").unwrap();
        assert_eq!(resp.item.id, 7);
        assert_eq!(resp.item.title, "t");
    }

    #[test]
    fn get_item_validates_input_before_sending() {
        let stub = StubTransport::ok(json!({"err": 0}));
        let c = client(&stub);
        assert!(matches!(c.get_item_by_id(0), Err(RollbarError::Validation(_))));
        assert!(matches!(c.get_item_by_id(-4), Err(RollbarError::Validation(_))));
        assert!(matches!(
            c.get_item_by_uuid("   "),
            Err(RollbarError::Validation(_))
        ));
        assert_eq!(stub.sent(), 0);
    }

    #[test]
    fn list_instances_accepts_wrapped_and_bare_shapes() {
        let instances = json!([
            {
                "id": 9001,
                "uuid": "abc",
                "body": {"trace": {"frames": [{"filename": "main.go", "lineno": 17, "method": "main"}]}}
            },
            {"id": 9002, "uuid": "def"}
        ]);

        let wrapped = StubTransport::ok(json!({"err": 0, "result": {"instances": instances}}));
        let bare = StubTransport::ok(json!({"err": 0, "result": instances}));

        let a = client(&wrapped).list_item_instances("555", 3).unwrap();
        let b = client(&bare).list_item_instances("555", 3).unwrap();
        assert_eq!(a.instances.len(), 2);
        assert_eq!(a.instances, b.instances);
        assert_eq!(a.instances[0].stack_frames[0].filename, "main.go");

        let req = wrapped.last();
        assert_eq!(
            Url::parse(&req.url).unwrap().path(),
            "/api/1/item/555/instances"
        );
        assert_eq!(query_values(&req.url, "page"), ["3"]);
    }

    #[test]
    fn list_instances_tolerates_unexpected_shapes() {
        for result in [json!("weird"), json!({"instances": {}}), json!(null), json!({})] {
            let stub = StubTransport::ok(json!({"err": 0, "result": result}));
            let resp = client(&stub).list_item_instances("uuid-1", 0).unwrap();
            assert!(resp.instances.is_empty());
            assert_eq!(Url::parse(&stub.last().url).unwrap().query(), None);
        }
    }

    #[test]
    fn list_instances_rejects_blank_identifier() {
        let stub = StubTransport::ok(json!({"err": 0}));
        assert!(matches!(
            client(&stub).list_item_instances("  ", 1),
            Err(RollbarError::Validation(_))
        ));
        assert_eq!(stub.sent(), 0);
    }

    #[test]
    fn update_sends_patch_with_sparse_body() {
        let stub = StubTransport::ok(json!({"err": 0, "result": {"item": {"id": 99, "title": "Updated"}}}));
        let mut fields = Map::new();
        fields.insert("status".into(), json!("resolved"));
        fields.insert("assigned_user_id".into(), Value::Null);

        let resp = client(&stub).update_item_by_id(99, &fields).unwrap();
        assert_eq!(resp.item.id, 99);
        assert_eq!(resp.item.title, "Updated");

        let req = stub.last();
        assert_eq!(req.method, Method::Patch);
        assert_eq!(Url::parse(&req.url).unwrap().path(), "/api/1/item/99");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let sent: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"status": "resolved", "assigned_user_id": null}));
    }

    #[test]
    fn update_without_echo_yields_zero_item() {
        let stub = StubTransport::ok(json!({"err": 0, "result": null}));
        let mut fields = Map::new();
        fields.insert("title".into(), json!("x"));
        let resp = client(&stub).update_item_by_id(5, &fields).unwrap();
        assert_eq!(resp.item.id, 0);
    }

    #[test]
    fn update_validates_before_sending() {
        let stub = StubTransport::ok(json!({"err": 0}));
        let c = client(&stub);
        assert!(matches!(
            c.update_item_by_id(99, &Map::new()),
            Err(RollbarError::Validation(_))
        ));
        let mut fields = Map::new();
        fields.insert("status".into(), json!("resolved"));
        assert!(matches!(
            c.update_item_by_id(0, &fields),
            Err(RollbarError::Validation(_))
        ));
        assert_eq!(stub.sent(), 0);
    }

    #[test]
    fn http_500_surfaces_as_transport_error() {
        let stub = StubTransport::new(500, "oops");
        let err = client(&stub).get_item_by_id(1).unwrap_err();
        assert!(matches!(err, RollbarError::Transport(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn service_err_surfaces_as_api_error() {
        let stub = StubTransport::new(200, r#"{"err":1,"message":"nope"}"#);
        let err = client(&stub)
            .list_items(&ListItemsOptions::default())
            .unwrap_err();
        assert!(matches!(err, RollbarError::Api { .. }));
        assert!(err.to_string().contains("nope"));
    }
}
