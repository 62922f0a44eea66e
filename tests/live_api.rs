//! Live end-to-end coverage against a running carta instance.
//!
//! - Reads the base URL from `CARTA_LIVE_BASE_URL` (default `http://127.0.0.1:8000`).
//! - Sends real HTTP requests, so the server and its database must be up.
//! - Marked `#[ignore]` so it only runs manually.

use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

struct Live {
    client: Client,
    base: String,
}

impl Live {
    fn from_env() -> Self {
        let base = std::env::var("CARTA_LIVE_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client: Client::new(),
            base,
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        expected: &[StatusCode],
        payload: Option<Value>,
    ) -> TestResult<(StatusCode, String)> {
        let url = format!("{}{path}", self.base);
        let mut builder = self.client.request(method.clone(), &url);
        if let Some(payload) = &payload {
            builder = builder.json(payload);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) if err.is_connect() => {
                return Err(format!(
                    "Cannot reach {url}. Start the carta server before running this test."
                )
                .into());
            }
            Err(err) => return Err(err.into()),
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !expected.contains(&status) {
            return Err(format!(
                "{method} {path} answered {status}, expected one of {expected:?}; body: {body}"
            )
            .into());
        }
        Ok((status, body))
    }

    async fn get(&self, path: &str, expected: &[StatusCode]) -> TestResult<Value> {
        let (_, body) = self.call(Method::GET, path, expected, None).await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, expected: &[StatusCode], payload: Value) -> TestResult<Value> {
        let (_, body) = self
            .call(Method::POST, path, expected, Some(payload))
            .await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    async fn patch(
        &self,
        path: &str,
        expected: &[StatusCode],
        payload: Value,
    ) -> TestResult<Value> {
        let (_, body) = self
            .call(Method::PATCH, path, expected, Some(payload))
            .await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    async fn delete(&self, path: &str, expected: &[StatusCode]) -> TestResult<Value> {
        let (_, body) = self.call(Method::DELETE, path, expected, None).await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn field(value: &Value, name: &str) -> TestResult<String> {
    Ok(value[name]
        .as_str()
        .ok_or_else(|| format!("response is missing `{name}`: {value}"))?
        .to_string())
}

#[tokio::test]
#[ignore]
async fn live_catalog_end_to_end() -> TestResult<()> {
    let live = Live::from_env();
    let suf = unique_suffix();

    let menu = live
        .post(
            "/api/v1/menus",
            &[StatusCode::CREATED],
            json!({"title": format!("Lunch {suf}"), "description": "weekday lunch"}),
        )
        .await?;
    let menu_id = field(&menu, "id")?;
    assert_eq!(menu["submenus_count"], 0);
    assert_eq!(menu["dishes_count"], 0);

    let submenu = live
        .post(
            &format!("/api/v1/menus/{menu_id}/submenus"),
            &[StatusCode::CREATED],
            json!({"title": format!("Starters {suf}")}),
        )
        .await?;
    let submenu_id = field(&submenu, "id")?;

    let dishes_path = format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes");
    live.post(
        &dishes_path,
        &[StatusCode::CREATED],
        json!({"title": format!("Soup {suf}"), "price": "3.50"}),
    )
    .await?;
    let dish = live
        .post(
            &dishes_path,
            &[StatusCode::CREATED],
            json!({"title": format!("Bruschetta {suf}"), "price": "4.20", "discount": 10}),
        )
        .await?;
    let dish_id = field(&dish, "id")?;

    let menu_view = live
        .get(&format!("/api/v1/menus/{menu_id}"), &[StatusCode::OK])
        .await?;
    assert_eq!(menu_view["submenus_count"], 1);
    assert_eq!(menu_view["dishes_count"], 2);

    let patched = live
        .patch(
            &format!("/api/v1/menus/{menu_id}"),
            &[StatusCode::OK],
            json!({"title": format!("Brunch {suf}")}),
        )
        .await?;
    assert_eq!(patched["description"], "weekday lunch");

    let patched = live
        .patch(
            &format!("{dishes_path}/{dish_id}"),
            &[StatusCode::OK],
            json!({"price": "3.80"}),
        )
        .await?;
    assert_eq!(patched["price"], "3.80");

    let snapshot = live.get("/api/v1/all_base", &[StatusCode::OK]).await?;
    let listed = snapshot
        .as_array()
        .map(|menus| {
            menus
                .iter()
                .any(|m| m["id"].as_str() == Some(menu_id.as_str()))
        })
        .unwrap_or(false);
    assert!(listed, "all_base should include the new menu");

    let deleted = live
        .delete(
            &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}"),
            &[StatusCode::OK],
        )
        .await?;
    assert_eq!(deleted["status"], true);

    let menu_view = live
        .get(&format!("/api/v1/menus/{menu_id}"), &[StatusCode::OK])
        .await?;
    assert_eq!(menu_view["submenus_count"], 0);
    assert_eq!(menu_view["dishes_count"], 0);

    live.delete(&format!("/api/v1/menus/{menu_id}"), &[StatusCode::OK])
        .await?;
    let missing = live
        .get(
            &format!("/api/v1/menus/{menu_id}"),
            &[StatusCode::NOT_FOUND],
        )
        .await?;
    assert_eq!(missing["error"]["message"], "menu not found");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_duplicate_menu_title_is_rejected() -> TestResult<()> {
    let live = Live::from_env();
    let title = format!("Duplicate {}", unique_suffix());

    let menu = live
        .post(
            "/api/v1/menus",
            &[StatusCode::CREATED],
            json!({"title": &title}),
        )
        .await?;
    let menu_id = field(&menu, "id")?;

    let error = live
        .post(
            "/api/v1/menus",
            &[StatusCode::BAD_REQUEST],
            json!({"title": &title}),
        )
        .await?;
    assert_eq!(error["error"]["code"], "duplicate");

    live.delete(&format!("/api/v1/menus/{menu_id}"), &[StatusCode::OK])
        .await?;

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_health_endpoint_answers() -> TestResult<()> {
    let live = Live::from_env();

    live.call(Method::GET, "/health", &[StatusCode::NO_CONTENT], None)
        .await?;

    Ok(())
}
