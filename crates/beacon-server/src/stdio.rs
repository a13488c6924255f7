/// Stdio JSON-RPC transport (`mcp.transport = stdio`): reads one request
/// per line from stdin, writes one response per line to stdout.
use crate::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::route_method;
use crate::state::AppState;
use std::io::{self, BufRead, BufReader, Write};
use tracing::{error, warn};

pub struct StdioServer {
    state: AppState,
}

impl StdioServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn run(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let reader = BufReader::new(stdin);

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!(error = %e, "error reading from stdin");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line).await;
            self.write_response(&response)?;
        }

        Ok(())
    }

    async fn handle_line(&self, line: &str) -> JsonRpcResponse {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => route_method(&request.method, request.params, request.id, &self.state).await,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request on stdin");
                JsonRpcResponse::error(None, JsonRpcError::parse_error())
            }
        }
    }

    fn write_response(&self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)?;
        let mut stdout = io::stdout();
        writeln!(stdout, "{json}")?;
        stdout.flush()
    }
}
