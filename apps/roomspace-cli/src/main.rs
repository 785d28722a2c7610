use std::path::PathBuf;
use std::sync::Barrier;
use std::thread;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use roomspace_common::{ObjectId, ParticipantId, Transform};
use roomspace_replicate::{Replica, decode_event, encode_event};
use roomspace_room::{Room, RoomConfig, Scene, TransformParam};
use roomspace_tools::RoomInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roomspace-cli", about = "CLI tool for roomspace operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Room configuration (YAML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the active configuration
    Info,
    /// Run a canned multi-participant scenario against the living room
    Scenario {
        #[arg(value_enum)]
        name: ScenarioName,
    },
    /// Print a summary of the living room
    Inspect {
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Let two participants interact before printing
        #[arg(short, long)]
        populate: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioName {
    GrabContest,
    Seating,
    Reaper,
    StaleSequence,
    LateJoin,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => RoomConfig::load(path)
            .with_context(|| format!("loading room config {}", path.display()))?,
        None => RoomConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("roomspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("room: {}", roomspace_room::crate_info());
            println!("tools: {}", roomspace_tools::crate_info());
            print!("{}", config.to_yaml()?);
        }
        Commands::Scenario { name } => {
            let room = living_room(config);
            tracing::info!(scenario = ?name, "running scenario");
            match name {
                ScenarioName::GrabContest => grab_contest(&room)?,
                ScenarioName::Seating => seating(&room)?,
                ScenarioName::Reaper => reaper(&room)?,
                ScenarioName::StaleSequence => stale_sequence(&room)?,
                ScenarioName::LateJoin => late_join(&room)?,
            }
        }
        Commands::Inspect { format, populate } => {
            let room = living_room(config);
            if populate {
                populate_room(&room)?;
            }
            match format {
                Format::Text => print!("{}", RoomInspector::summary(&room)),
                Format::Json => println!("{}", RoomInspector::to_json(&room)?),
            }
        }
    }

    Ok(())
}

fn living_room(config: RoomConfig) -> Room {
    let scene = Scene::living_room(&config.doors);
    Room::new(config, scene)
}

fn object(room: &Room, name: &str) -> anyhow::Result<ObjectId> {
    room.scene()
        .find(name)
        .with_context(|| format!("scene has no {name}"))
}

fn grab_contest(room: &Room) -> anyhow::Result<()> {
    let lamp = object(room, "lamp")?;
    let contenders = [ParticipantId(1), ParticipantId(2)];
    for p in contenders {
        room.participant_joined(p)?;
    }
    println!("Grab contest: {} and {} grab the lamp at once", contenders[0], contenders[1]);

    let barrier = Barrier::new(contenders.len());
    let outcomes = thread::scope(|s| {
        let handles: Vec<_> = contenders
            .iter()
            .map(|&p| {
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    (p, room.request_grab(p, lamp))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join()).collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| anyhow::anyhow!("grab thread panicked"))?;

    for (p, outcome) in outcomes {
        match outcome {
            Ok(grant) => println!("  {p}: granted at tick {}", grant.record.acquired_tick),
            Err(err) => println!("  {p}: denied ({err})"),
        }
    }
    match room.registry().owner_of(lamp) {
        Some(owner) => println!("Owner: {owner}"),
        None => anyhow::bail!("nobody won the lamp"),
    }
    Ok(())
}

fn seating(room: &Room) -> anyhow::Result<()> {
    let sofa = object(room, "sofa")?;
    println!("Seating: four participants try a three-seat sofa");
    for id in 1..=4 {
        let p = ParticipantId(id);
        room.participant_joined(p)?;
        match room.request_sit(p, sofa) {
            Ok(index) => println!("  {p}: seat {index}"),
            Err(err) => println!("  {p}: denied ({err})"),
        }
    }
    let stood = room.movement_input(ParticipantId(2), glam::Vec2::new(0.0, 1.0))?;
    println!("  p2 walks away: stood={}", stood.is_some());
    match room.request_sit(ParticipantId(4), sofa) {
        Ok(index) => println!("  p4: seat {index}"),
        Err(err) => println!("  p4: denied ({err})"),
    }
    Ok(())
}

fn reaper(room: &Room) -> anyhow::Result<()> {
    let lamp = object(room, "lamp")?;
    let sofa = object(room, "sofa")?;
    let (a, b) = (ParticipantId(1), ParticipantId(2));
    room.participant_joined(a)?;
    room.participant_joined(b)?;
    room.request_grab(a, lamp)?;
    room.update_held_pose(a, lamp, Transform::from_position(Vec3::new(0.5, 1.4, -1.0)))?;
    room.request_sit(a, sofa)?;
    println!("Reaper: {a} holds the lamp and sits, then disconnects");

    let report = room.participant_left(a)?;
    println!(
        "  revoked={} vacated={} promoted={}",
        report.revoked.len(),
        report.vacated.is_some(),
        report.promoted.map_or_else(|| "none".to_owned(), |p| p.to_string())
    );
    match room.request_grab(a, lamp) {
        Ok(_) => anyhow::bail!("departed participant was granted the lamp"),
        Err(err) => println!("  {a} after leaving: denied ({err})"),
    }
    let grant = room.request_grab(b, lamp)?;
    println!("  {b}: granted the lamp (fresh={})", grant.fresh);
    Ok(())
}

fn stale_sequence(room: &Room) -> anyhow::Result<()> {
    let tv = object(room, "television")?;
    let host = ParticipantId(1);
    let sub = room.participant_joined(host)?;
    for _ in 0..7 {
        room.toggle_interaction(host, tv)?;
    }
    let events: Vec<_> = sub.reliable.try_iter().collect();
    println!("Stale sequence: {} toggles, delivered as 1-4, 5, 3, 7, 6", events.len());

    let mut replica = Replica::new(ParticipantId(2), room.scene().objects.iter().cloned());
    for index in [0, 1, 2, 3, 4, 2, 6, 5] {
        let Some(event) = events.get(index) else {
            anyhow::bail!("missing event {}", index + 1);
        };
        match replica.receive(*event) {
            Ok(applied) => {
                let seqs: Vec<u64> = applied.iter().map(|e| e.seq).collect();
                println!("  seq {} -> applied {seqs:?}", event.seq);
            }
            Err(err) => println!("  seq {} -> {err}", event.seq),
        }
    }
    println!(
        "Converged: {}",
        replica.registry().state_hash() == room.registry().state_hash()
    );
    Ok(())
}

fn late_join(room: &Room) -> anyhow::Result<()> {
    populate_room(room)?;
    let late = ParticipantId(9);
    let sub = room.participant_joined(late)?;

    let mut bytes = 0;
    let mut replay = sub.replay.clone();
    for event in &mut replay.events {
        let encoded = encode_event(event)?;
        bytes += encoded.len();
        *event = decode_event(&encoded)?;
    }
    let mut replica = Replica::new(late, room.scene().objects.iter().cloned());
    let applied = replica.apply_replay(&replay);
    println!(
        "Late join: {late} replayed {} events ({bytes} bytes on the wire)",
        applied.len()
    );
    println!("  host hash    {:#018x}", room.registry().state_hash());
    println!("  replica hash {:#018x}", replica.registry().state_hash());
    if replica.registry().state_hash() != room.registry().state_hash() {
        anyhow::bail!("late joiner diverged from the room");
    }
    println!("Match: OK");
    Ok(())
}

/// Two participants move, switch and sit on things.
fn populate_room(room: &Room) -> anyhow::Result<()> {
    let (a, b) = (ParticipantId(1), ParticipantId(2));
    let lamp = object(room, "lamp")?;
    let crate_ = object(room, "crate")?;
    let door = object(room, "door")?;
    let sofa = object(room, "sofa")?;
    room.participant_joined(a)?;
    room.participant_joined(b)?;

    room.advance_tick();
    room.request_grab(a, lamp)?;
    room.update_held_pose(a, lamp, Transform::from_position(Vec3::new(1.0, 1.1, -1.5)))?;
    room.release_grab(a, lamp)?;
    room.toggle_interaction(a, lamp)?;
    room.set_transform_param(a, lamp, TransformParam::Rotation, 30.0)?;

    room.advance_tick();
    room.request_grab(b, crate_)?;
    room.update_held_pose(b, crate_, Transform::from_position(Vec3::new(-1.0, 2.0, -2.0)))?;
    room.release_grab(b, crate_)?;
    room.set_transform_param(b, crate_, TransformParam::Scale, 0.8)?;
    room.toggle_interaction(b, door)?;
    room.request_sit(b, sofa)?;
    Ok(())
}
