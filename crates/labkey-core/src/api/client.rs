use crate::api::models::{LoginForm, SelectRowsResponse};
use crate::core::aliases::AliasMap;
use crate::core::filters::FilterSpec;
use crate::core::instance::InstanceConfig;
use crate::core::query::NativeRequest;
use crate::core::table::{ResultTable, TableShape};
use crate::error::{ApiError, AppError, AuthError};
use crate::utils::error_helpers::*;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use std::fmt;
use std::sync::Arc;

/// Cookie LabKey issues once a login succeeds
pub const SESSION_COOKIE: &str = "JSESSIONID";
const LOGIN_PATH: &str = "login/login.post";
const USER_AGENT: &str = concat!("labkey-core/", env!("CARGO_PKG_VERSION"));

/// A client for one LabKey instance.
///
/// Each client owns its own cookie jar; `login` is the only operation that
/// changes it, hence `&mut self`.
pub struct LabKeyClient {
    client: Client,
    cookies: Arc<Jar>,
    base_url: Url,
    aliases: AliasMap,
    config: InstanceConfig,
}

impl LabKeyClient {
    pub fn new(config: InstanceConfig) -> Result<Self, AppError> {
        let aliases = AliasMap::new(config.aliases.clone())?;

        let base_url = Url::parse(&config.host).map_err(|e| ApiError::InvalidUrl {
            url: config.host.clone(),
            message: e.to_string(),
        })?;

        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init"))?;

        Ok(LabKeyClient {
            client,
            cookies,
            base_url,
            aliases,
            config,
        })
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Resolve `relative` against the configured host.
    ///
    /// ```
    /// # use labkey_core::api::client::LabKeyClient;
    /// # use labkey_core::core::instance::InstanceConfig;
    /// # fn config(host: &str) -> InstanceConfig {
    /// #     InstanceConfig {
    /// #         host: host.to_string(), email: String::new(), password: String::new(),
    /// #         project: "home".to_string(), schema: "lists".to_string(),
    /// #         query_name: "Q".to_string(), columns: vec![], aliases: Default::default(),
    /// #         custom_columns: Default::default(), column_order: vec![],
    /// #     }
    /// # }
    /// let client = LabKeyClient::new(config("http://localhost:9004/labkey/")).unwrap();
    /// assert_eq!(
    ///     client.url("login/login.post").unwrap().as_str(),
    ///     "http://localhost:9004/labkey/login/login.post"
    /// );
    /// ```
    pub fn url(&self, relative: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(relative)
            .map_err(|e| ApiError::InvalidUrl {
                url: format!("{}{}", self.base_url, relative),
                message: e.to_string(),
            })
    }

    /// Whether the session currently carries the LabKey session cookie.
    pub fn is_authenticated(&self) -> bool {
        self.url(LOGIN_PATH)
            .map(|url| self.has_session_cookie(&url))
            .unwrap_or(false)
    }

    fn has_session_cookie(&self, url: &Url) -> bool {
        let Some(header) = self.cookies.cookies(url) else {
            return false;
        };
        header.to_str().is_ok_and(|cookies| {
            cookies
                .split(';')
                .filter_map(|pair| pair.trim().split_once('='))
                .any(|(name, _)| name == SESSION_COOKIE)
        })
    }

    /// Log in with the given credentials, or the configured ones.
    ///
    /// LabKey answers a failed login with a 200 sign-in page, so success is
    /// judged by the session cookie, not the status.
    pub async fn login(
        &mut self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), AppError> {
        let endpoint = LOGIN_PATH;
        let url = self.url(endpoint)?;

        let form = LoginForm {
            email: email.unwrap_or(&self.config.email),
            password: password.unwrap_or(&self.config.password),
        };

        log::debug!("Logging in to {} as {}", url, form.email);

        let response = self
            .client
            .post(url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Api(convert_request_error(e, endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Api(convert_status_error(
                status, endpoint, error_text,
            )));
        }

        if !self.has_session_cookie(&url) {
            return Err(AppError::Auth(AuthError::NoSessionCookie {
                host: self.config.host.clone(),
                cookie: SESSION_COOKIE.to_string(),
            }));
        }

        Ok(())
    }

    /// Run the configured query with `filters` and reshape the rows.
    pub async fn query(&self, filters: &FilterSpec) -> Result<ResultTable, AppError> {
        let endpoint = format!("query/{}/selectRows.api", self.config.project);
        let url = self.url(&endpoint)?;

        let request = NativeRequest::build(
            &self.config.schema,
            &self.config.query_name,
            &self.config.columns,
            &self.aliases,
            filters,
        )?;

        log::debug!(
            "GET {} with {} parameters ({} filters)",
            url,
            request.len(),
            filters.len()
        );

        let response = self
            .client
            .get(url)
            .query(request.params())
            .send()
            .await
            .map_err(|e| AppError::Api(convert_request_error(e, &endpoint)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Api(convert_request_error(e, &endpoint)))?;

        if !status.is_success() {
            return Err(AppError::Api(convert_status_error(status, &endpoint, body)));
        }

        let SelectRowsResponse { rows, metadata } = SelectRowsResponse::parse(&body, &endpoint)?;
        log::debug!("{} returned {} rows", endpoint, rows.len());

        let shape = TableShape {
            aliases: &self.aliases,
            custom_columns: &self.config.custom_columns,
            column_order: &self.config.column_order,
            columns: &self.config.columns,
        };
        Ok(shape.apply(rows, metadata))
    }
}

impl fmt::Debug for LabKeyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabKeyClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResponseError;
    use indexmap::IndexMap;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(host: &str) -> InstanceConfig {
        let mut aliases = IndexMap::new();
        aliases.insert("gender".to_string(), "specimen_id/donor_sex".to_string());

        InstanceConfig {
            host: host.to_string(),
            email: "alice@x.com".to_string(),
            password: "s3cret".to_string(),
            project: "home".to_string(),
            schema: "lists".to_string(),
            query_name: "Specimens".to_string(),
            columns: vec!["id".to_string(), "gender".to_string()],
            aliases,
            custom_columns: IndexMap::new(),
            column_order: vec![],
        }
    }

    fn client_for(mock_server: &MockServer) -> LabKeyClient {
        LabKeyClient::new(test_config(&format!("{}/labkey/", mock_server.uri())))
            .expect("client creation failed")
    }

    fn session_cookie() -> ResponseTemplate {
        ResponseTemplate::new(200).insert_header("Set-Cookie", "JSESSIONID=abc123; Path=/")
    }

    #[test]
    fn test_client_creation() {
        let client = LabKeyClient::new(test_config("http://example.test/labkey/"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_not_authenticated_without_login() {
        let client = LabKeyClient::new(test_config("http://example.test/labkey/"))
            .expect("client creation failed");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_ambiguous_aliases_are_rejected() {
        let mut config = test_config("http://example.test/");
        config
            .aliases
            .insert("sex".to_string(), "specimen_id/donor_sex".to_string());
        assert!(matches!(
            LabKeyClient::new(config),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_url_trailing_slash_is_significant() {
        let client = LabKeyClient::new(test_config("http://localhost:9004/labkey/"))
            .expect("client creation failed");
        assert_eq!(
            client.url("login/login.post").expect("joins").as_str(),
            "http://localhost:9004/labkey/login/login.post"
        );

        let client = LabKeyClient::new(test_config("http://localhost:9004/labkey"))
            .expect("client creation failed");
        assert_eq!(
            client.url("login/login.post").expect("joins").as_str(),
            "http://localhost:9004/login/login.post"
        );
    }

    #[tokio::test]
    async fn test_login_stores_session_cookie() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/labkey/login/login.post"))
            .and(body_string_contains("email=alice%40x.com"))
            .and(body_string_contains("password=s3cret"))
            .respond_with(session_cookie())
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        client.login(None, None).await.expect("login succeeds");
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_with_explicit_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/labkey/login/login.post"))
            .and(body_string_contains("email=bob%40y.org"))
            .and(body_string_contains("password=other"))
            .respond_with(session_cookie())
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        client
            .login(Some("bob@y.org"), Some("other"))
            .await
            .expect("login succeeds");
    }

    #[tokio::test]
    async fn test_login_without_cookie_is_auth_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/labkey/login/login.post"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>Sign In</html>"))
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        let result = client.login(None, None).await;
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::NoSessionCookie { .. }))
        ));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_http_error_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/labkey/login/login.post"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        let result = client.login(None, None).await;
        assert!(matches!(
            result,
            Err(AppError::Api(ApiError::Http { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_query_translates_and_relabels() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/labkey/query/home/selectRows.api"))
            .and(query_param("schemaName", "lists"))
            .and(query_param("query.queryName", "Specimens"))
            .and(query_param("query.columns", "id,specimen_id/donor_sex"))
            .and(query_param("query.specimen_id/donor_sex~eq", "Male"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "schemaName": "lists",
                "queryName": "Specimens",
                "rowCount": 2,
                "rows": [
                    {"id": 1, "specimen_id/donor_sex": "Male"},
                    {"id": 2, "specimen_id/donor_sex": "Male"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let filters = FilterSpec::new().with("gender~eq", "Male");
        let table = client.query(&filters).await.expect("query succeeds");

        assert_eq!(table.columns(), &["id".to_string(), "gender".to_string()][..]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "gender"), Some(&json!("Male")));
        assert_eq!(table.metadata().row_count(), Some(2));
        assert_eq!(table.metadata().schema_name(), Some("lists"));
        assert!(table.metadata().get("rows").is_none());
    }

    #[tokio::test]
    async fn test_query_reuses_session_cookie() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/labkey/login/login.post"))
            .respond_with(session_cookie())
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/labkey/query/home/selectRows.api"))
            .and(header("cookie", "JSESSIONID=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        client.login(None, None).await.expect("login succeeds");
        let table = client.query(&FilterSpec::new()).await.expect("query succeeds");
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_not_shared_between_clients() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/labkey/login/login.post"))
            .respond_with(session_cookie())
            .mount(&mock_server)
            .await;

        let mut first = client_for(&mock_server);
        let second = client_for(&mock_server);
        first.login(None, None).await.expect("login succeeds");

        assert!(first.is_authenticated());
        assert!(!second.is_authenticated());
    }

    #[tokio::test]
    async fn test_query_http_error_is_fatal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/labkey/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(401).set_body_string("User does not have permission"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        match client.query(&FilterSpec::new()).await {
            Err(AppError::Api(ApiError::Http {
                status, message, ..
            })) => {
                assert_eq!(status, 401);
                assert_eq!(message, "User does not have permission");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/labkey/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>Sign In</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.query(&FilterSpec::new()).await;
        assert!(matches!(
            result,
            Err(AppError::Response(ResponseError::InvalidJson { .. }))
        ));
    }

    #[tokio::test]
    async fn test_query_without_rows_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/labkey/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rowCount": 0})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.query(&FilterSpec::new()).await;
        assert!(matches!(
            result,
            Err(AppError::Response(ResponseError::MissingRows { .. }))
        ));
    }

    #[tokio::test]
    async fn test_invalid_filter_is_rejected_before_sending() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let filters = FilterSpec::new().with("gender", "Male");
        assert!(matches!(
            client.query(&filters).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_rows_keep_custom_columns() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/labkey/query/home/selectRows.api"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"rows": [], "rowCount": 0})),
            )
            .mount(&mock_server)
            .await;

        let mut config = test_config(&format!("{}/labkey/", mock_server.uri()));
        config
            .custom_columns
            .insert("site".to_string(), json!("Boston"));
        config.column_order = vec!["site".to_string(), "id".to_string()];

        let client = LabKeyClient::new(config).expect("client creation failed");
        let table = client.query(&FilterSpec::new()).await.expect("query succeeds");

        assert!(table.is_empty());
        assert_eq!(table.columns(), &["site".to_string()][..]);
        assert_eq!(table.metadata().row_count(), Some(0));
    }

    #[tokio::test]
    async fn test_repeated_query_is_identical() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/labkey/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rowCount": 1,
                "rows": [{"id": 7, "specimen_id/donor_sex": "Female"}]
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let filters = FilterSpec::new().with("gender~eq", "Female");
        let first = client.query(&filters).await.expect("query succeeds");
        let second = client.query(&filters).await.expect("query succeeds");
        assert_eq!(first, second);
    }
}
