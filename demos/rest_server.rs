//! A `user` resource served with format suffixes.
//!
//! Try:
//!
//! ```text
//! curl -X POST -H 'Content-Type: application/json' -d '{"name":"Ada"}' localhost:8080/user.json
//! curl localhost:8080/user/1.yml
//! curl localhost:8080/user/1.dump
//! curl -X DELETE localhost:8080/user/1
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use microhttp_rest::rest::status::{status_bad_request, status_created, status_not_found, status_ok};
use microhttp_rest::rest::{Actions, Rest, RestConfig};
use microhttp_rest::{HttpRequest, HttpServer, ServerConfig};

#[derive(Default)]
struct Users {
    next_id: AtomicU64,
    rows: Mutex<BTreeMap<u64, Value>>,
}

fn user_id(req: &HttpRequest) -> Option<u64> {
    req.param("id").and_then(|id| id.parse().ok())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/rest.toml");
    let rest = Rest::new(RestConfig::load(config_path)?)?;

    let server = HttpServer::new(ServerConfig::default());
    rest.prepare_serializer_for_format(&server).await;

    let users = Arc::new(Users::default());
    let (for_get, for_create, for_update, for_delete) = (users.clone(), users.clone(), users.clone(), users.clone());

    let actions = Actions::new()
        .get(move |req| {
            let users = for_get.clone();
            async move {
                let Some(id) = user_id(&req) else {
                    return Ok(status_bad_request("id must be a number"));
                };
                Ok(match users.rows.lock().await.get(&id) {
                    Some(user) => status_ok(user.clone()),
                    None => status_not_found(format!("user {id} not found")),
                })
            }
        })
        .create(move |req| {
            let users = for_create.clone();
            async move {
                let Ok(mut user) = req.json::<Value>() else {
                    return Ok(status_bad_request("expected a JSON body"));
                };
                let id = users.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                user["id"] = json!(id);
                users.rows.lock().await.insert(id, user.clone());
                Ok(status_created(user))
            }
        })
        .update(move |req| {
            let users = for_update.clone();
            async move {
                let (Some(id), Ok(mut user)) = (user_id(&req), req.json::<Value>()) else {
                    return Ok(status_bad_request("expected a numeric id and a JSON body"));
                };
                let mut rows = users.rows.lock().await;
                if !rows.contains_key(&id) {
                    return Ok(status_not_found(format!("user {id} not found")));
                }
                user["id"] = json!(id);
                rows.insert(id, user.clone());
                Ok(status_ok(user))
            }
        })
        .delete(move |req| {
            let users = for_delete.clone();
            async move {
                let Some(id) = user_id(&req) else {
                    return Ok(status_bad_request("id must be a number"));
                };
                Ok(match users.rows.lock().await.remove(&id) {
                    Some(user) => status_ok(user),
                    None => status_not_found(format!("user {id} not found")),
                })
            }
        });

    rest.resource(&server, "user", actions).await?;

    server.start().await?;

    Ok(())
}
