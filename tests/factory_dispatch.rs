//! Factory dispatch must be resolvable without ever touching the channel
//! client: probing for unrelated class ids carries zero cost and must not
//! trigger the lazy singleton.
//!
//! Lives in its own test binary because the singleton is process-wide.

use uuid::Uuid;

use sync_overlays::{create_handler, OverlayError, StatusChannelClient, CLASS_ID_WARNING};

#[test]
fn dispatch_never_initializes_the_channel_client() {
    assert!(!StatusChannelClient::is_initialized());

    let bogus = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
    match create_handler(bogus) {
        Err(OverlayError::ClassNotAvailable { class_id }) => assert_eq!(class_id, bogus),
        other => panic!(
            "Expected ClassNotAvailable, got {:?}",
            other.map(|h| h.category())
        ),
    }
    assert!(!StatusChannelClient::is_initialized());

    // Successful dispatch constructs the handler, still not the client.
    let handler = create_handler(CLASS_ID_WARNING).unwrap();
    assert_eq!(handler.priority(), 2);
    assert!(!StatusChannelClient::is_initialized());
}
