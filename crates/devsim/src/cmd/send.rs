use std::net::SocketAddr;
use std::time::{Duration, Instant};

use devsim_client::{DeviceClient, RetryPolicy};
use devsim_frame::{Frame, Request, RESP_ERR};
use devsim_transport::Endpoint;

use crate::cmd::{parse_duration, SendArgs, TransportKind};
use crate::exit::{
    client_error, io_error, transport_error, CliError, CliResult, FAILURE, SUCCESS, USAGE,
};
use crate::output::{print_response, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let remote = args
        .addr
        .parse::<Endpoint>()
        .and_then(|endpoint| endpoint.resolve())
        .map_err(|err| transport_error("invalid address", err))?;
    let msg_type = parse_msg_type(&args.msg_type)?;
    let policy = RetryPolicy::new(
        args.attempts,
        parse_duration(&args.base_delay)?,
        parse_duration(&args.max_delay)?,
    );
    let timeout = args.timeout.as_deref().map(parse_duration).transpose()?;
    let payload = args.data.unwrap_or_default().into_bytes();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed starting runtime", err))?;

    let started = Instant::now();
    let frame = runtime.block_on(send(
        args.transport,
        remote,
        timeout,
        msg_type,
        &payload,
        &policy,
    ))?;

    print_response(
        &frame,
        args.transport.as_str(),
        remote,
        started.elapsed(),
        format,
    );

    if frame.msg_type == RESP_ERR {
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

async fn send(
    transport: TransportKind,
    remote: SocketAddr,
    timeout: Option<Duration>,
    msg_type: u8,
    payload: &[u8],
    policy: &RetryPolicy,
) -> CliResult<Frame> {
    let result = match transport {
        TransportKind::Udp => {
            let mut client = DeviceClient::datagram(remote);
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout);
            }
            client.request(msg_type, payload, Some(policy)).await
        }
        TransportKind::Tcp => {
            let mut client = DeviceClient::stream(remote);
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout);
            }
            client.request(msg_type, payload, Some(policy)).await
        }
    };
    result.map_err(|err| client_error("request failed", err))
}

/// Accepts a request name (any case) or a raw message type code.
fn parse_msg_type(input: &str) -> CliResult<u8> {
    let request = match input.to_ascii_lowercase().as_str() {
        "ping" => Some(Request::Ping),
        "status" => Some(Request::Status),
        "start" => Some(Request::Start),
        "stop" => Some(Request::Stop),
        _ => None,
    };
    if let Some(request) = request {
        return Ok(request.msg_type());
    }
    input.parse::<u8>().map_err(|_| {
        CliError::new(
            USAGE,
            format!("invalid --type {input:?} (expected ping, status, start, stop or 0-255)"),
        )
    })
}
