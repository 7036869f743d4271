/// Talks to a port nothing listens on, so every connection is refused.
use arduino_ctl::client::{DeviceApi, DeviceClient};
use arduino_ctl::{
    Channel, DeviceConfig, DeviceErrorKind, Direction, MoveCommand, MovementProtocol, PanelConfig,
};

fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn client(movement: MovementProtocol) -> DeviceClient {
    DeviceClient::new(DeviceConfig::new(refused_base_url(), 2000, movement)).unwrap()
}

#[tokio::test]
async fn test_movement_is_unreachable() {
    for protocol in [MovementProtocol::Motors, MovementProtocol::Path] {
        let client = client(protocol);

        for direction in Direction::ALL {
            let err = client.move_in(direction).await.unwrap_err();
            assert_eq!(err.kind(), DeviceErrorKind::Unreachable, "{:?} via {}", direction, protocol);
            assert!(std::error::Error::source(&err).is_some(), "transport error should be kept");
        }

        let err = client.command(MoveCommand::Stop).await.unwrap_err();
        assert_eq!(err.kind(), DeviceErrorKind::Unreachable);
    }
}

#[tokio::test]
async fn test_toggle_is_unreachable() {
    let client = client(MovementProtocol::Motors);

    for channel in Channel::ALL {
        let err = client.set_toggle(channel, true).await.unwrap_err();
        assert!(err.is_unreachable(), "{} gave {:?}", channel, err.kind());
        assert!(!err.is_timeout());
    }
}

#[tokio::test]
async fn test_stats_are_empty_when_unreachable() {
    let client = client(MovementProtocol::Motors);
    assert!(client.get_stats().await.is_empty());
}

#[tokio::test]
async fn test_padded_base_url_from_toml_is_still_unreachable() {
    let toml = format!("[device]\nbase_url = \"{} \"\n", refused_base_url());
    let config = PanelConfig::from_toml(&toml).unwrap();
    let client = DeviceClient::new(config.device).unwrap();

    let err = client.move_in(Direction::Up).await.unwrap_err();
    assert_eq!(err.kind(), DeviceErrorKind::Unreachable);

    let err = client.set_toggle(Channel::Magnetic, true).await.unwrap_err();
    assert_eq!(err.kind(), DeviceErrorKind::Unreachable);
}
