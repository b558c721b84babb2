use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::domain::effects::{EffectOutcome, EffectRequest, StatValue};
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory, InventoryChange};
use crate::domain::errors::SessionError;
use crate::domain::ports::{EffectDispatcher, SnapshotSource};
use crate::interface_adapters::protocol::{
    ActorDto, BridgeErrorDto, EffectBody, EffectReplyDto, InventoryChangeDto, InventoryDto,
};

// Thin reqwest client for the JSON bridge in front of the live session.
#[derive(Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url: String = base_url.into();
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        ensure_success(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| SessionError::Decode(e.to_string()))
    }
}

// Maps non-2xx replies to `Upstream`, keeping the bridge's message when it sent one.
async fn ensure_success(response: Response) -> Result<Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<BridgeErrorDto>()
        .await
        .ok()
        .map(|body| body.message);
    Err(SessionError::Upstream {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SnapshotSource for BridgeClient {
    async fn list_actors(&self) -> Result<Vec<ActorSnapshot>, SessionError> {
        let actors: Vec<ActorDto> = self.get_json("/actors").await?;
        Ok(actors.into_iter().map(ActorSnapshot::from).collect())
    }

    async fn inventory(&self, actor: ActorId) -> Result<Option<Inventory>, SessionError> {
        match self
            .get_json::<Option<InventoryDto>>(&format!("/actors/{actor}/inventory"))
            .await
        {
            Ok(inventory) => Ok(inventory.map(Inventory::from)),
            Err(SessionError::Upstream { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn inventory_changes(&self) -> Result<Vec<InventoryChange>, SessionError> {
        let changes: Vec<InventoryChangeDto> = self.get_json("/inventory-changes").await?;
        Ok(changes.into_iter().map(InventoryChange::from).collect())
    }
}

#[async_trait]
impl EffectDispatcher for BridgeClient {
    async fn send(&self, effect: &EffectRequest) -> Result<EffectOutcome, SessionError> {
        let response = self
            .http
            .post(format!("{}/effects", self.base_url))
            .json(&EffectBody::from(effect))
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let body = ensure_success(response)
            .await?
            .bytes()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        // Plain effects may come back with an empty body.
        if body.is_empty() {
            return Ok(EffectOutcome::Applied);
        }
        let reply: EffectReplyDto =
            serde_json::from_slice(&body).map_err(|e| SessionError::Decode(e.to_string()))?;
        debug!(effect = effect.kind(), balance = ?reply.balance, "effect applied");

        Ok(match (reply.balance, reply.stats) {
            (Some(balance), _) => EffectOutcome::Balance(balance),
            (None, Some(stats)) => {
                EffectOutcome::Stats(stats.into_iter().map(StatValue::from).collect())
            }
            (None, None) => EffectOutcome::Applied,
        })
    }
}
