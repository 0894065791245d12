use env_logger::Env;
use gpui::*;
use gpui_component::Root;
use gpui_dnd_outline::core::OutlineConfig;
use log::{info, warn};

mod outline_story;

use outline_story::OutlineStory;

/// Read the outline settings from the JSON file named by `OUTLINE_CONFIG`.
fn load_config() -> OutlineConfig {
    let Ok(path) = std::env::var("OUTLINE_CONFIG") else {
        return OutlineConfig::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|json| OutlineConfig::from_json(&json).map_err(anyhow::Error::from));
    match loaded {
        Ok(config) => {
            info!("loaded outline config from {path}");
            config
        }
        Err(err) => {
            warn!("ignoring outline config {path}: {err:#}");
            OutlineConfig::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = load_config();
    // Remaining arguments name options to flip, e.g. `selected_branch_only`.
    let option_keys: Vec<String> = std::env::args().skip(1).collect();
    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        gpui_dnd_outline::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitlebarOptions {
                        title: Some("Block Outline".into()),
                        appears_transparent: false,
                        traffic_light_position: None,
                    }),
                    ..Default::default()
                },
                |window, cx| {
                    let view = OutlineStory::view(config, option_keys, window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });
}
