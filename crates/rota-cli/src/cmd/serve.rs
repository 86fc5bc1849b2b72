use anyhow::Context;
use rota_server::AppState;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let state = AppState::load(root.to_path_buf()).context("failed to load project")?;
    let port = port.unwrap_or(state.config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(rota_server::serve(state, port))
}
