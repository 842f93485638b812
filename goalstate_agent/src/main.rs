//! Drives exactly one goal-state fetch cycle against a wire-server endpoint
//! and prints a human-readable summary of the result.

extern crate clap;
extern crate goalstate_agent;
extern crate goalstate_protocol;
extern crate loggerv;

#[macro_use]
extern crate log;

use clap::{App, Arg};
use goalstate_agent::{OpensslCrypto, ReqwestTransport};
use goalstate_protocol::{fetch_goal_state, ContainerIdRegister, GoalState, SystemClock};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const DEFAULT_ENDPOINT: &str = "168.63.129.16";
const DEFAULT_LIB_DIR: &str = "./lib";

fn main() {
    let matches = App::new("goalstate_agent")
        .about("Fetches and reports the wire-server goal state for this VM")
        .arg(
            Arg::with_name("endpoint")
                .long("endpoint")
                .takes_value(true)
                .help("wire-server endpoint (host or host:port); falls back to WIRE_SERVER_ENDPOINT"),
        )
        .arg(
            Arg::with_name("lib-dir")
                .long("lib-dir")
                .takes_value(true)
                .help("library directory for certificates and transport key material; falls back to WIRE_SERVER_LIB_DIR"),
        )
        .arg(Arg::with_name("v").short("v").multiple(true).help("increase logging verbosity (-v, -vv)"))
        .get_matches();

    loggerv::init_with_verbosity(matches.occurrences_of("v")).expect("failed to initialize logger");
    goalstate_agent::init();

    let endpoint = matches
        .value_of("endpoint")
        .map(String::from)
        .or_else(|| std::env::var("WIRE_SERVER_ENDPOINT").ok())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let lib_dir = matches
        .value_of("lib-dir")
        .map(PathBuf::from)
        .or_else(|| std::env::var("WIRE_SERVER_LIB_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIB_DIR));

    if let Err(e) = fs::create_dir_all(&lib_dir) {
        eprintln!("could not create library directory {}: {}", lib_dir.display(), e);
        process::exit(1);
    }

    if let Err(e) = run(&endpoint, &lib_dir) {
        eprintln!("goalstate_agent failed: {}", e);
        process::exit(1);
    }
}

fn run(endpoint: &str, lib_dir: &Path) -> goalstate_protocol::Result<()> {
    let transport_cert_base64 = read_transport_cert_base64(lib_dir);
    let transport = ReqwestTransport::new(transport_cert_base64);
    let crypto = OpensslCrypto::new();
    let clock = SystemClock;
    let register = ContainerIdRegister::new();

    let root_uri = format!("http://{}/machine/?comp=goalstate", endpoint);
    let mut goal_state = fetch_goal_state(&transport, &clock, &register, &root_uri)?;
    info!("fetched goal state incarnation {} for role instance {}", goal_state.incarnation, goal_state.role_instance_id);

    goal_state.fetch_full_goal_state(&transport, &crypto, lib_dir)?;

    print_summary(&goal_state);
    Ok(())
}

/// `TransportCert.pem` is a read-only input written by an earlier subsystem;
/// its base64 body (no PEM markers) is what the wire server expects in the
/// certificate-retrieval header.
fn read_transport_cert_base64(lib_dir: &Path) -> Option<String> {
    let content = fs::read_to_string(lib_dir.join("TransportCert.pem")).ok()?;
    let stripped: String = content.lines().filter(|l| !l.starts_with("-----")).collect();
    Some(stripped)
}

fn print_summary(goal_state: &GoalState) {
    println!("incarnation:          {}", goal_state.incarnation);
    println!("role instance id:     {}", goal_state.role_instance_id);
    println!("role config name:     {}", goal_state.role_config_name);
    println!("container id:         {}", goal_state.container_id);

    if let Some(hosting_env) = &goal_state.hosting_env {
        println!("vm name:              {:?}", hosting_env.vm_name);
        println!("role name:            {:?}", hosting_env.role_name);
    }

    if let Some(certs) = &goal_state.certs {
        println!("certificates:         {}", certs.cert_list.len());
    }

    if let Some(ext_conf) = &goal_state.ext_conf {
        println!("extension handlers:   {}", ext_conf.ext_handlers.len());
        for handler in &ext_conf.ext_handlers {
            println!("  - {} {} ({} extensions)", handler.name, handler.version, handler.extensions.len());
            if let Some(reason) = &handler.invalid_setting_reason {
                println!("    invalid: {}", reason);
            }
        }
    }

    if let Some(remote_access) = &goal_state.remote_access {
        println!("remote access users:  {}", remote_access.user_list.len());
    }
}
