#[tokio::main]
async fn main() {
    aldenaire::start_server().await;
}
