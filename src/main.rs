//! # 搜索拼图服务：命令行入口
//!
//! 本文件仅负责参数解析、设置加载与服务生命周期。
//! 业务逻辑位于 `collage` 模块，详见 `lib.rs` 架构文档。
//!
//! 提供查询参数时处理一次后退出；否则逐行读取标准输入，每行作为一次查询。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use search_collage::collage::{
    CollageDelivery, CollageService, blank_placeholder, load_placeholder,
};
use search_collage::error::AppError;
use search_collage::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "search-collage", version, about = "根据搜索词生成图片拼图")]
struct Cli {
    /// 搜索词；省略时从标准输入逐行读取
    query: Option<String>,

    /// 请求图片数量（1~200），默认取设置值
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// 设置文件（JSON）
    #[arg(long)]
    settings: Option<PathBuf>,

    /// 无结果时使用的占位图，优先于设置文件
    #[arg(long)]
    placeholder: Option<PathBuf>,

    /// 拼图输出目录
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ 运行失败: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = Settings::load(cli.settings.as_deref())?;
    let placeholder_path = cli.placeholder.clone().or_else(|| settings.placeholder_path.clone());
    let config = settings.into_config()?;

    let placeholder = match placeholder_path {
        Some(path) => load_placeholder(&path)?,
        None => {
            log::info!("🖼️ 未配置占位图，使用空白图");
            blank_placeholder(&config.layout)
        }
    };

    std::fs::create_dir_all(&cli.out_dir)?;

    let service = CollageService::start(config, placeholder)?;
    let result = serve(&service, &cli).await;
    service.shutdown();
    result
}

async fn serve(service: &CollageService, cli: &Cli) -> Result<(), AppError> {
    if let Some(query) = cli.query.as_deref() {
        let delivery = service.handle_query_with_count(query, cli.count).await?;
        deliver(&cli.out_dir, 1, &delivery)?;
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut seq = 0u32;

    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match service.handle_query_with_count(query, cli.count).await {
            Ok(delivery) => {
                seq += 1;
                deliver(&cli.out_dir, seq, &delivery)?;
            }
            Err(err) => log::warn!(
                "⚠️ 查询失败 - q={:?} code={} stage={}: {}",
                query,
                err.code(),
                err.stage(),
                err
            ),
        }
    }

    Ok(())
}

fn deliver(out_dir: &Path, seq: u32, delivery: &CollageDelivery) -> Result<(), AppError> {
    let path = out_dir.join(format!("collage-{:03}.jpg", seq));
    std::fs::write(&path, &delivery.image)?;

    log::info!(
        "💾 拼图已保存 - {} images={} placeholder={} size={}B",
        path.display(),
        delivery.image_count,
        delivery.placeholder,
        delivery.image.len()
    );
    println!("{}\t{}", delivery.caption, path.display());
    Ok(())
}
