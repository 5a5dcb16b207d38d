//! Binary entry point: resolve configuration, bring up logging and the SQLite
//! store, restore the cached session, then drive the Ratatui event loop until
//! the user exits.
use anyhow::Context;
use setlist_builder::session::{restore_details, restore_setlist};
use setlist_builder::{
    ensure_schema, logging, run_app, App, Config, JsonSessionStore, Sequencer, SessionContext,
    SheetRenderer,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to resolve configuration")?;
    logging::init(&config.log_path())?;
    info!(scope = %config.scope, data_dir = %config.data_dir().display(), "starting setlist builder");

    let conn = ensure_schema(&config.db_path())?;
    let context = SessionContext::load(&conn, &config.scope)?;

    let session = JsonSessionStore::new(config.session_dir(), &config.scope);
    let mut sequencer = Sequencer::new().with_sink(Box::new(session.clone()));
    sequencer.restore(restore_setlist(&session));
    let details = restore_details(&session);
    info!(entries = sequencer.len(), "session restored");

    let renderer = SheetRenderer::new(config.export_dir());
    let mut app = App::new(
        conn,
        context,
        sequencer,
        details,
        Box::new(session),
        Box::new(renderer),
    );
    run_app(&mut app)
}
