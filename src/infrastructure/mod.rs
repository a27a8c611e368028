// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod grafana_client;
pub mod http_response;
pub mod slack_client;
pub mod slack_payload;
pub mod slack_signature;
