//! Opt-in re-authentication policy.
//!
//! `LabKeyClient::query` never logs in on its own. Callers that want a
//! session refreshed on demand wrap the call with [`query_with_relogin`].

use crate::api::client::LabKeyClient;
use crate::core::filters::FilterSpec;
use crate::core::table::ResultTable;
use crate::error::AppError;

/// Run `query`; on HTTP 401/403 log in once with the stored credentials and
/// retry once. Every other outcome is returned unchanged.
pub async fn query_with_relogin(
    client: &mut LabKeyClient,
    filters: &FilterSpec,
) -> Result<ResultTable, AppError> {
    let first = client.query(filters).await;
    match first {
        Err(AppError::Api(error)) if error.is_unauthorized() => {
            log::debug!(
                "Query on {} was rejected ({}), logging in and retrying once",
                client.host(),
                error
            );
            client.login(None, None).await?;
            client.query(filters).await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instance::InstanceConfig;
    use crate::error::ApiError;
    use indexmap::IndexMap;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(mock_server: &MockServer) -> LabKeyClient {
        LabKeyClient::new(InstanceConfig {
            host: format!("{}/", mock_server.uri()),
            email: "alice@x.com".to_string(),
            password: "s3cret".to_string(),
            project: "home".to_string(),
            schema: "lists".to_string(),
            query_name: "Specimens".to_string(),
            columns: vec!["id".to_string()],
            aliases: IndexMap::new(),
            custom_columns: IndexMap::new(),
            column_order: vec![],
        })
        .expect("client creation failed")
    }

    #[tokio::test]
    async fn test_relogin_after_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": [{"id": 1}]})))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/login/login.post"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Set-Cookie", "JSESSIONID=abc; Path=/"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        let table = query_with_relogin(&mut client, &FilterSpec::new())
            .await
            .expect("second attempt succeeds");
        assert_eq!(table.len(), 1);
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_no_relogin_on_other_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/login/login.post"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        let result = query_with_relogin(&mut client, &FilterSpec::new()).await;
        assert!(matches!(
            result,
            Err(AppError::Api(ApiError::Http { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_retries_only_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query/home/selectRows.api"))
            .respond_with(ResponseTemplate::new(403))
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/login/login.post"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Set-Cookie", "JSESSIONID=abc; Path=/"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = client_for(&mock_server);
        let result = query_with_relogin(&mut client, &FilterSpec::new()).await;
        assert!(matches!(
            result,
            Err(AppError::Api(ApiError::Http { status: 403, .. }))
        ));
    }
}
