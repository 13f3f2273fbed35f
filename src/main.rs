use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // 日志输出到 stderr，默认 info 级别，可用 RUST_LOG 调整
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match book_press_lib::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ 生成失败: {}", e);
            ExitCode::FAILURE
        }
    }
}
