#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::option_if_let_else,
)]
#![warn(rust_2018_idioms)]

use anyhow::{bail, Context, Result};
use director::{facade::LoadOptions, Movie};
use pico_args::Arguments;
use std::{env, fs, path::PathBuf, process::exit};

enum Command {
    Detect,
    PrintConfig,
    PrintCasts,
    PrintCastMembers,
    PrintResources,
    PrintResource(String),
    PrintScore(Option<(usize, usize)>),
    Decompile,
}

fn exit_usage() -> ! {
    eprintln!(
        "{} file inspector\n\n\
         usage: director-inspect [--unprotect] <command> [options] <file>...\n\n\
         commands:\n  \
           detect                 print container kind, endianness, and version\n  \
           print-config           print stage size, frame rate, and version\n  \
           print-casts            list cast libraries\n  \
           print-cast-members     list every cast member's number, type, and name\n  \
           print-resources        list every chunk's id, fourcc, and length\n  \
           print-resource --id X  dump the raw bytes of chunk id X\n  \
           print-score [--frames a,b]  print channel assignments per frame\n  \
           decompile              decompile every reachable script to Lingo source",
        director::name(true)
    );
    exit(1);
}

fn parse_frames(frames: &str) -> Result<(usize, usize)> {
    match frames.split(',').collect::<Vec<_>>().as_slice() {
        [start, end] => {
            let start = start.parse::<usize>().with_context(|| format!("malformed start frame '{start}'"))?;
            let end = end.parse::<usize>().with_context(|| format!("malformed end frame '{end}'"))?;
            Ok((start, end))
        },
        [frame] => {
            let frame = frame.parse::<usize>().with_context(|| format!("malformed frame '{frame}'"))?;
            Ok((frame, frame + 1))
        },
        _ => bail!("malformed frame range '{}'", frames),
    }
}

fn parse_command(args: &mut Arguments) -> Result<Command> {
    let Some(subcommand) = args.subcommand()? else { bail!("missing command") };
    Ok(match subcommand.as_str() {
        "detect" => Command::Detect,
        "print-config" => Command::PrintConfig,
        "print-casts" => Command::PrintCasts,
        "print-cast-members" => Command::PrintCastMembers,
        "print-resources" => Command::PrintResources,
        "print-resource" => Command::PrintResource(args.value_from_str("--id")?),
        "print-score" => Command::PrintScore(args.opt_value_from_fn("--frames", parse_frames)?),
        "decompile" => Command::Decompile,
        other => bail!("invalid command '{other}'"),
    })
}

fn run(filename: &str, command: &Command, unprotect: bool) -> Result<()> {
    let bytes = fs::read(filename).with_context(|| format!("reading '{filename}'"))?;
    let movie = Movie::load_with_options(bytes, LoadOptions { unprotect })?;

    match command {
        Command::Detect => {
            println!("{}: {} ({})", filename, movie.version(), if movie.is_cast_file() { "cast" } else { "movie" });
        },
        Command::PrintConfig => {
            let (width, height) = movie.stage_size();
            println!("version: {}", movie.version());
            println!("stage: {width}x{height}");
            println!("frame rate: {}", movie.frame_rate());
        },
        Command::PrintCasts => {
            if let Some(list) = movie.cast_list() {
                for entry in &list.entries {
                    println!("{} ({})", entry.name, entry.path);
                }
            } else {
                println!("(single unnamed cast)");
            }
        },
        Command::PrintCastMembers => {
            for asset in movie.assets() {
                match asset.load() {
                    Ok(member) => println!("{}: {:?} {}", asset.chunk_id().0, member.member_type, member.name().unwrap_or_default()),
                    Err(e) => println!("{}: <error: {e}>", asset.chunk_id().0),
                }
            }
        },
        Command::PrintResources => {
            for id in movie.chunk_index().all_ids() {
                if let Some(info) = movie.chunk_index().by_id(id) {
                    println!("{}: {} ({} bytes)", id.0, info.fourcc, info.uncompressed_len);
                }
            }
        },
        Command::PrintResource(id) => {
            let id = id.parse::<i32>().with_context(|| format!("malformed chunk id '{id}'"))?;
            let body = movie.chunk_index().body(director::ChunkId(id))?;
            for chunk in body.chunks(16) {
                let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
                println!("{}", hex.join(" "));
            }
        },
        Command::PrintScore(range) => {
            use director::player::ScorePlayer;
            let player = ScorePlayer::load(movie.chunk_index())?;
            let (start, end) = range.unwrap_or((0, player.frame_count()));
            for number in start..end.min(player.frame_count()) {
                let Some(frame) = player.frame(number) else { break };
                print!("frame {number}:");
                for (channel, slot) in frame.channels.iter().enumerate() {
                    if let Some(member) = slot.member {
                        print!(" [{channel}]={}", member.0);
                    }
                }
                println!();
            }
        },
        Command::Decompile => {
            for script in movie.scripts() {
                println!("{}", script.source()?);
            }
        },
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    eprintln!("{} file inspector", director::name(true));

    let mut args = Arguments::from_env();
    let unprotect = args.contains("--unprotect");
    let command = match parse_command(&mut args) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("{error}");
            exit_usage();
        },
    };
    let files = args.free()?;

    if files.is_empty() {
        eprintln!("no files specified");
        exit_usage();
    }

    for filename in &files {
        if files.len() > 1 {
            println!("{filename}:");
        }
        if let Err(e) = run(filename, &command, unprotect) {
            println!("{e:?}");
            if files.len() == 1 {
                return Err(e);
            }
        }
        if files.len() > 1 {
            println!();
        }
    }

    Ok(())
}
