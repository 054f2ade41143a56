#[tokio::main]
async fn main() {
    talk_to_computer::run().await
}
