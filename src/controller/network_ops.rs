// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Network HTTP API operations against the controller.
//!
//! Every call is a single request. There is no retry: a failed request fails the run.

use super::types::{AddressPool, NetworkResponse, RemoteRoute, RoutesUpdate};
use crate::constants::{AUTHORIZATION_SCHEME, JSON_CONTENT_TYPE, NETWORK_PATH_SEGMENT};
use crate::errors::RoutesError;
use crate::http_errors::{map_connection_error, map_http_error_to_reason};
use reqwest::{header, Client as HttpClient, Method, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info};
use url::Url;

/// Normalize and validate the controller base URL.
///
/// Trailing slashes are dropped so paths can be appended with `/`.
///
/// # Errors
///
/// Returns [`RoutesError::Config`] if the URL does not parse or is not http(s).
pub(crate) fn build_api_url(base_url: &str) -> Result<String, RoutesError> {
    const OPERATION: &str = "build_api_url";

    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| {
        RoutesError::config(OPERATION, format!("invalid controller URL '{base_url}': {e}"))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        scheme => Err(RoutesError::config(
            OPERATION,
            format!("unsupported controller URL scheme '{scheme}' in '{base_url}'"),
        )),
    }
}

/// URL of a single network resource.
pub(crate) fn network_url(base_url: &str, network_id: &str) -> String {
    format!("{base_url}/{NETWORK_PATH_SEGMENT}/{network_id}")
}

/// Execute one authenticated request and return the response body.
///
/// Any status other than `200 OK` is an error carrying the body verbatim.
///
/// # Errors
///
/// Returns [`RoutesError::Controller`] if the request cannot be sent, the body
/// cannot be read, or the status is not 200.
async fn controller_request<T: Serialize + ?Sized>(
    client: &HttpClient,
    operation: &'static str,
    token: &str,
    method: Method,
    url: &str,
    body: Option<&T>,
) -> Result<String, RoutesError> {
    info!(method = %method, url = %url, "HTTP API request to controller");

    let mut request = client
        .request(method.clone(), url)
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(
            header::AUTHORIZATION,
            format!("{AUTHORIZATION_SCHEME} {token}"),
        );

    if let Some(body_data) = body {
        request = request.json(body_data);
    }

    let response = request.send().await.map_err(|e| {
        let (reason, hint) = map_connection_error();
        error!(
            method = %method,
            url = %url,
            reason = reason,
            error = %e,
            "{hint}"
        );
        RoutesError::Controller {
            operation,
            status: None,
            body: format!("failed to send request to {url}: {e}"),
        }
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| RoutesError::Controller {
        operation,
        status: Some(status.as_u16()),
        body: format!("failed to read response body: {e}"),
    })?;

    if status != StatusCode::OK {
        let (reason, hint) = map_http_error_to_reason(status.as_u16());
        error!(
            method = %method,
            url = %url,
            status = %status,
            reason = reason,
            error = %text,
            "{hint}"
        );
        return Err(RoutesError::Controller {
            operation,
            status: Some(status.as_u16()),
            body: text,
        });
    }

    info!(
        method = %method,
        url = %url,
        status = %status,
        response_len = text.len(),
        "HTTP API request successful"
    );

    Ok(text)
}

/// Read the address-assignment pools of a network.
///
/// # Errors
///
/// Returns [`RoutesError::Controller`] on a non-200 response or when the body is
/// not a network document with `config.ipAssignmentPools`.
pub async fn fetch_pools(
    client: &HttpClient,
    base_url: &str,
    network_id: &str,
    token: &str,
) -> Result<Vec<AddressPool>, RoutesError> {
    const OPERATION: &str = "fetch_pools";

    let url = network_url(base_url, network_id);
    let body =
        controller_request(client, OPERATION, token, Method::GET, &url, None::<&()>).await?;

    let network: NetworkResponse =
        serde_json::from_str(&body).map_err(|e| RoutesError::Controller {
            operation: OPERATION,
            status: Some(StatusCode::OK.as_u16()),
            body: format!("malformed network document ({e}): {body}"),
        })?;

    let pools = network.config.ip_assignment_pools;
    debug!(network = %network_id, pools = pools.len(), "Fetched address pools");

    Ok(pools)
}

/// Replace the network's route table with `routes`.
///
/// This is a full replacement: any route missing from `routes` is removed by
/// the controller.
///
/// # Errors
///
/// Returns [`RoutesError::Controller`] on any non-200 response.
pub async fn push_routes(
    client: &HttpClient,
    base_url: &str,
    network_id: &str,
    token: &str,
    routes: &[RemoteRoute],
) -> Result<(), RoutesError> {
    const OPERATION: &str = "push_routes";

    let url = network_url(base_url, network_id);
    let payload = RoutesUpdate::new(routes);

    controller_request(client, OPERATION, token, Method::POST, &url, Some(&payload)).await?;

    info!(network = %network_id, routes = routes.len(), "Route table replaced");
    Ok(())
}
