mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn admin_endpoints_require_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/admin/query", server.base_url))
        .json(&serde_json::json!({ "query": "users who spend > 1000" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/admin/campaigns", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/admin/export/somefile", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn email_blast_requires_a_session_before_validation() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // The admin gate runs before the empty-recipient check
    let res = client
        .post(format!("{}/api/send-emails", server.base_url))
        .json(&serde_json::json!({ "emails": [] }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
