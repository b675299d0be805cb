use futures_util::{SinkExt, StreamExt};
use shared::{ClientEvent, ServerEvent, SidePreference};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

// Smoke-test client: creates a game, asks for the lobby listing and prints
// every event the server sends back. Useful for poking a running server
// without a browser.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:3000".to_string());
    println!("Connecting to {}", url);

    let (mut ws, _) = connect_async(url).await?;
    println!("Connected");

    let create = ClientEvent::CreateGame {
        name: "probe".to_string(),
        side: SidePreference::Either,
    };
    ws.send(Message::Text(serde_json::to_string(&create)?)).await?;
    ws.send(Message::Text(serde_json::to_string(&ClientEvent::ListGames)?))
        .await?;

    while let Some(message) = ws.next().await {
        match message? {
            Message::Text(text) => {
                let event: ServerEvent = serde_json::from_str(&text)?;
                println!("<- {:?}", event);

                if let ServerEvent::GamesList { games } = event {
                    println!("{} game(s) listed", games.len());
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}
