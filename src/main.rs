/// Entry point and game loop.

use std::time::{Duration, Instant};

use tracing::info;
use tracing_subscriber::EnvFilter;

use lumin_grove::config::GameConfig;
use lumin_grove::domain::entity::FrameInput;
use lumin_grove::sim::event::GameEvent;
use lumin_grove::sim::layout::WorldLayout;
use lumin_grove::sim::save::{FileStore, MemoryStore, SaveStore};
use lumin_grove::sim::step::Session;
use lumin_grove::ui::console::Console;
use lumin_grove::ui::input::InputState;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    init_tracing();
    let config = GameConfig::load();
    let layout = WorldLayout::load(config.layout_file.as_deref());

    let store: Box<dyn SaveStore> = if std::env::args().any(|a| a == "--no-save") {
        info!("saving disabled for this session");
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::in_save_dir(&config.save_file))
    };
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms.max(1));
    let (mut session, opening) = Session::start(config, layout, store);

    let mut console = Console::stdout();
    let mut input = InputState::new();
    match console.init() {
        Ok(release_events) => input.honor_release = release_events,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    }

    let result = game_loop(&mut session, &mut console, &mut input, tick_rate, opening);

    if let Err(e) = console.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Quest stage reached: {}", session.world().stage());
}

fn game_loop(
    session: &mut Session,
    console: &mut Console<std::io::Stdout>,
    input: &mut InputState,
    tick_rate: Duration,
    opening: Vec<GameEvent>,
) -> std::io::Result<()> {
    console.line("Lumin Grove  |  arrows/wasd move (shift runs), space attack, e interact, p save, l load, X erase save, esc quit")?;
    console.render_events(&opening)?;
    console.render_dialogue(session.dialogue())?;

    let mut last_tick = Instant::now();
    let mut pending = FrameInput::default();

    loop {
        input.drain_events();
        if input.quit_pressed() {
            break;
        }
        if input.advance_pressed() && session.advance_dialogue() {
            console.render_dialogue(session.dialogue())?;
        }
        if input.clear_pressed() {
            session.clear_save();
        }

        // Edges between ticks are latched until the next step
        let frame = input.frame_input();
        pending.attack |= frame.attack;
        pending.interact |= frame.interact;
        pending.save |= frame.save;
        pending.load |= frame.load;

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            pending.movement = frame.movement;
            pending.run = frame.run;
            let events = session.step(&pending, elapsed.as_secs_f32() * 1000.0);
            pending = FrameInput::default();
            last_tick = Instant::now();

            console.render_events(&events)?;
            console.render_dialogue(session.dialogue())?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
