#[tokio::main]
async fn main() {
    if let Err(e) = quiz_grader::run().await {
        eprintln!("quiz-grader fatal: {e:#}");
        std::process::exit(1);
    }
}
