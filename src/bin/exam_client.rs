#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match riyaziyyat::run_exam_client(args).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("exam_client: {e:#}");
            1
        }
    };
    // A blocked stdin read would otherwise keep the runtime from shutting down.
    std::process::exit(code);
}
