use std::net::SocketAddr;

use devsim_device::{Device, SeededRandom};
use devsim_server::{ServerConfig, Simulator};
use devsim_transport::Endpoint;
use tracing::{info, warn};

use crate::cmd::{parse_duration, ServeArgs};
use crate::exit::{control_error, io_error, server_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_listening, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = ServerConfig {
        datagram_addr: resolve("invalid --udp address", &args.udp)?,
        stream_addr: resolve("invalid --tcp address", &args.tcp)?,
        read_timeout: parse_duration(&args.read_timeout)?,
    };
    let device = build_device(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed starting runtime", err))?;
    runtime.block_on(serve(config, device, format))
}

async fn serve(config: ServerConfig, device: Device, format: OutputFormat) -> CliResult<i32> {
    let simulator = Simulator::bind(&config, device.clone())
        .await
        .map_err(|err| server_error("failed to start simulator", err))?;
    let udp = simulator
        .datagram_addr()
        .map_err(|err| server_error("failed reading udp address", err))?;
    let tcp = simulator
        .stream_addr()
        .map_err(|err| server_error("failed reading tcp address", err))?;

    print_listening(udp, tcp, &device.status(), format);

    simulator
        .run_until(shutdown_signal())
        .await
        .map_err(|err| server_error("simulator failed", err))?;

    info!(reset_count = device.status().reset_count, "simulator stopped");
    Ok(SUCCESS)
}

fn build_device(args: &ServeArgs) -> CliResult<Device> {
    let device = match args.seed {
        Some(seed) => Device::with_random(SeededRandom::new(seed)),
        None => Device::new(),
    };
    device
        .set_faults(args.delay_ms, args.drop_rate, args.corrupt_rate)
        .map_err(|err| control_error("invalid fault settings", err))?;
    if args.configure {
        device
            .configure()
            .map_err(|err| control_error("configure failed", err))?;
    }
    Ok(device)
}

fn resolve(context: &str, addr: &str) -> CliResult<SocketAddr> {
    addr.parse::<Endpoint>()
        .and_then(|endpoint| endpoint.resolve())
        .map_err(|err| transport_error(context, err))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for interrupt; serving until killed");
        std::future::pending::<()>().await;
    }
}
