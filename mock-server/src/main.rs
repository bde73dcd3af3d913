use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("fake Wikimedia REST API on http://{addr}");
    println!("  try http://{addr}/core/v1/wikipedia/en/page/Earth/bare");
    println!("  and http://{addr}/core/v1/wikipedia/en/page/Earth/links/media");
    mock_server::run(listener).await
}
