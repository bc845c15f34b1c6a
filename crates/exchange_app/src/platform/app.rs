use std::io::{self, BufRead, Stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use exchange_core::{
    apply_view_updates, update, ContainerHandle, ExchangeFields, ExchangeStore, Msg,
};
use exchange_engine::{decode_markup, MarkupImporter};
use exchange_logging::{exchange_info, exchange_warn, LogDestination};
use simplelog::LevelFilter;

use super::commands::{parse_command, Command, HELP};
use super::config::{load_config, AppConfig, DEFAULT_CONFIG_FILENAME};
use super::effects::EffectRunner;
use super::render::TerminalRenderer;

const LIST_CONTAINER: ContainerHandle = ContainerHandle(1);

enum Input {
    Command(Command),
    Invalid(String),
    Closed,
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    let loaded = load_config(&config_path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    let destination = match &config.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    exchange_logging::initialize(destination, LevelFilter::Info);
    if found {
        exchange_info!("Loaded config from {:?}", config_path);
    } else {
        exchange_warn!("No config at {:?}; using defaults", config_path);
    }

    let runner = EffectRunner::new(&config)?;
    let mut app = App {
        state: ExchangeStore::with_translations(config.translations.clone()),
        runner,
        renderer: TerminalRenderer::new(io::stdout()),
    };

    app.dispatch(Msg::PlaceIn(LIST_CONTAINER));
    if let Some(path) = &config.markup_path {
        let fields = load_markup(&config, path)?;
        app.dispatch(Msg::ExchangesLoaded(fields));
    }
    app.runner.start_polling();
    app.renderer.notice(HELP);

    let input_rx = spawn_stdin_reader();
    loop {
        match input_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(Input::Command(Command::Quit)) | Ok(Input::Closed) => break,
            Ok(Input::Command(Command::List)) => {
                let view = app.state.view();
                app.renderer.print_list(&view);
            }
            Ok(Input::Command(Command::Help)) => app.renderer.notice(HELP),
            Ok(Input::Command(command)) => {
                for msg in command.into_msgs() {
                    app.dispatch(msg);
                }
            }
            Ok(Input::Invalid(reason)) => app.renderer.notice(&reason),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        for msg in app.runner.pending_msgs() {
            app.dispatch(msg);
        }
    }

    exchange_info!("Shutting down");
    Ok(())
}

struct App {
    state: ExchangeStore,
    runner: EffectRunner,
    renderer: TerminalRenderer<Stdout>,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            apply_view_updates(state.take_view_updates(), &mut self.renderer);
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}

fn load_markup(config: &AppConfig, path: &Path) -> anyhow::Result<Vec<ExchangeFields>> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read markup {:?}", path))?;
    let decoded = decode_markup(&bytes, config.markup_charset.as_deref())?;
    exchange_info!(
        "Decoded markup {:?} as {}",
        path,
        decoded.encoding_label
    );

    let importer = MarkupImporter::new(&config.markup_selectors())?;
    let mut fields = Vec::new();
    for (index, result) in importer.import_document(&decoded.html).into_iter().enumerate() {
        match result {
            Ok(item) => fields.push(item),
            Err(err) => exchange_warn!("Skipping exchange node {}: {}", index, err),
        }
    }
    Ok(fields)
}

fn spawn_stdin_reader() -> mpsc::Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let input = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => match parse_command(&line) {
                    Ok(command) => Input::Command(command),
                    Err(err) => Input::Invalid(format!("{err}; {HELP}")),
                },
                Err(_) => break,
            };
            if tx.send(input).is_err() {
                return;
            }
        }
        let _ = tx.send(Input::Closed);
    });
    rx
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::load_markup;
    use crate::platform::config::AppConfig;

    const LATIN1_PAGE: &[u8] = b"<html><head><meta charset=\"windows-1252\"></head><body>\
<div class=\"exchange\"><div class=\"details\">Incoming\n+1 Ren\xe9</div>\
<div class=\"msg text\">caf\xe9</div><input class=\"resp_box\" name=\"respond_5\"></div>\
<div class=\"exchange\"><div class=\"details\">Incoming</div></div>\
</body></html>";

    fn markup_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(bytes).expect("write markup");
        file
    }

    #[test]
    fn markup_file_decodes_from_its_meta_charset() {
        let file = markup_file(LATIN1_PAGE);
        let fields = load_markup(&AppConfig::default(), file.path()).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].id, "respond_5");
        assert_eq!(fields[0].message, "café");
        assert_eq!(fields[0].name, "René");
    }

    #[test]
    fn configured_charset_overrides_the_document() {
        let file = markup_file(
            b"<meta charset=\"utf-8\"><div class=\"exchange\"><div class=\"details\">a\n+1 Zo\xeb</div>\
<div class=\"msg text\">x</div><input class=\"resp_box\" name=\"r_2\"></div>",
        );
        let config = AppConfig {
            markup_charset: Some("iso-8859-1".to_string()),
            ..AppConfig::default()
        };
        let fields = load_markup(&config, file.path()).unwrap();
        assert_eq!(fields[0].name, "Zoë");
    }

    #[test]
    fn missing_markup_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_markup(&AppConfig::default(), &dir.path().join("none.html")).is_err());
    }
}
