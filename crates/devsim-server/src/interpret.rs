//! Request interpretation.
//!
//! Split in two phases: [`decide`] fixes the response and the transition (if
//! any) from a state snapshot, then [`Decision::commit`] applies the
//! transition. [`exchange`] runs both under the device lock, so the bytes a
//! client sees always match the transition taken.

use bytes::Bytes;
use devsim_device::{Device, DeviceState, SimModel, Transition};
use devsim_frame::{Frame, Request, RESP_ERR, RESP_OK, RESP_STATE};
use tracing::{debug, warn};

/// `RESP_OK` payload for PING.
pub const PONG: &[u8] = b"PONG";
/// `RESP_OK` payload for an accepted START.
pub const STREAMING: &[u8] = b"STREAMING";
/// `RESP_OK` payload for an accepted STOP.
pub const STOPPED: &[u8] = b"STOPPED";
/// `RESP_ERR` payload when the device state forbids the request.
pub const BAD_STATE: &[u8] = b"BAD_STATE";
/// `RESP_ERR` payload for message types outside the request set.
pub const UNKNOWN_REQ: &[u8] = b"UNKNOWN_REQ";

/// A response together with the state change it commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub response: Frame,
    pub transition: Option<Transition>,
}

impl Decision {
    fn reply(msg_type: u8, payload: &'static [u8]) -> Self {
        Self {
            response: Frame::new(msg_type, Bytes::from_static(payload)),
            transition: None,
        }
    }

    /// Apply the decided transition and hand back the response.
    pub fn commit(self, model: &mut SimModel) -> Frame {
        if let Some(transition) = self.transition {
            if let Err(err) = model.apply(transition) {
                // Only reachable if the model moved between decide and commit.
                warn!(error = %err, "decided transition no longer applies");
            }
        }
        self.response
    }
}

/// Decide the response to `msg_type` given the current device state.
///
/// Pure: the state is not touched.
pub fn decide(msg_type: u8, state: DeviceState) -> Decision {
    match Request::from_msg_type(msg_type) {
        Some(Request::Ping) => Decision::reply(RESP_OK, PONG),
        Some(Request::Status) => Decision::reply(RESP_STATE, state.as_str().as_bytes()),
        Some(Request::Start) => guarded(state, Transition::Start, STREAMING),
        Some(Request::Stop) => guarded(state, Transition::Stop, STOPPED),
        None => Decision::reply(RESP_ERR, UNKNOWN_REQ),
    }
}

fn guarded(state: DeviceState, transition: Transition, accepted: &'static [u8]) -> Decision {
    match state.transition(transition) {
        Ok(_) => Decision {
            transition: Some(transition),
            ..Decision::reply(RESP_OK, accepted)
        },
        Err(_) => Decision::reply(RESP_ERR, BAD_STATE),
    }
}

/// Decide and commit one request against the shared device.
pub fn exchange(device: &Device, request: &Frame) -> Frame {
    device.transact(|model| {
        let decision = decide(request.msg_type, model.state());
        debug!(
            msg_type = request.msg_type,
            state = %model.state(),
            transition = ?decision.transition,
            "request decided"
        );
        decision.commit(model)
    })
}

#[cfg(test)]
mod tests {
    use devsim_frame::{REQ_PING, REQ_START, REQ_STATUS, REQ_STOP};

    use super::*;

    fn payload(decision: &Decision) -> &[u8] {
        decision.response.payload.as_ref()
    }

    #[test]
    fn ping_is_state_independent() {
        for state in [
            DeviceState::Idle,
            DeviceState::Configured,
            DeviceState::Streaming,
        ] {
            let d = decide(REQ_PING, state);
            assert_eq!((d.response.msg_type, payload(&d)), (RESP_OK, PONG));
            assert_eq!(d.transition, None);
        }
    }

    #[test]
    fn status_reports_state_name() {
        let d = decide(REQ_STATUS, DeviceState::Streaming);
        assert_eq!(d.response.msg_type, RESP_STATE);
        assert_eq!(payload(&d), b"STREAMING");
    }

    #[test]
    fn start_requires_configured() {
        let rejected = decide(REQ_START, DeviceState::Idle);
        assert_eq!((rejected.response.msg_type, payload(&rejected)), (RESP_ERR, BAD_STATE));
        assert_eq!(rejected.transition, None);

        let accepted = decide(REQ_START, DeviceState::Configured);
        assert_eq!((accepted.response.msg_type, payload(&accepted)), (RESP_OK, STREAMING));
        assert_eq!(accepted.transition, Some(Transition::Start));
    }

    #[test]
    fn stop_requires_streaming() {
        let rejected = decide(REQ_STOP, DeviceState::Configured);
        assert_eq!(payload(&rejected), BAD_STATE);

        let accepted = decide(REQ_STOP, DeviceState::Streaming);
        assert_eq!((accepted.response.msg_type, payload(&accepted)), (RESP_OK, STOPPED));
        assert_eq!(accepted.transition, Some(Transition::Stop));
    }

    #[test]
    fn unknown_and_response_types_get_unknown_req() {
        for msg_type in [0, 5, RESP_OK, RESP_STATE, 255] {
            let d = decide(msg_type, DeviceState::Idle);
            assert_eq!((d.response.msg_type, payload(&d)), (RESP_ERR, UNKNOWN_REQ));
        }
    }

    #[test]
    fn decide_does_not_mutate_commit_does() {
        let device = Device::new();
        device.configure().unwrap();

        let decision = decide(REQ_START, device.health());
        assert_eq!(device.health(), DeviceState::Configured);

        let response = device.transact(|model| decision.commit(model));
        assert_eq!(response.payload.as_ref(), STREAMING);
        assert_eq!(device.health(), DeviceState::Streaming);
    }

    #[test]
    fn exchange_applies_transition() {
        let device = Device::new();
        device.configure().unwrap();

        let response = exchange(&device, &Frame::new(REQ_START, Bytes::new()));
        assert_eq!(response.msg_type, RESP_OK);
        assert_eq!(device.health(), DeviceState::Streaming);

        let again = exchange(&device, &Frame::new(REQ_START, Bytes::new()));
        assert_eq!(again.payload.as_ref(), BAD_STATE);
        assert_eq!(device.health(), DeviceState::Streaming);
    }
}
