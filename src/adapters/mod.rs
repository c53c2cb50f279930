// Adapters layer: Lambda endpoint client, origin client and the HTTP server.

pub mod lambda_client;
pub mod origin;
pub mod server;
