// Interface adapters: session bridge client, wire DTOs and the operator HTTP surface.

pub mod clients;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
