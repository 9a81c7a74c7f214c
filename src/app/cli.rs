// ==========================================
// 配送线路看板 - 命令行宿主
// ==========================================
// 用法:
//   route-evolution [--db PATH] import FILE...
//   route-evolution [--db PATH] list [--region R] [--driver D] [--search S] [--sort KEY] [--desc]
//   route-evolution [--db PATH] summary [--region R]
//   route-evolution [--db PATH] drivers [--region R]
//   route-evolution [--db PATH] add DRIVER [--count N] [--region R] [--at TIME]
//   route-evolution [--db PATH] failure RECORD_ID VALUE
//   route-evolution [--db PATH] batch-route ROUTE [--region R] [--driver D] [--search S]
//   route-evolution [--db PATH] config [KEY VALUE]
//   route-evolution [--db PATH] clear
// ==========================================

use crate::api::{ManualRecordRequest, ViewQuery};
use crate::app::state::{get_default_db_path, AppState};
use crate::engine::view::{SortDirection, SortKey, SortState};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "route-evolution", version)]
#[command(about = "Evolutivo de Rotas - 配送线路导入与汇总")]
pub struct Cli {
    /// 数据库路径（缺省: ROUTE_EVOLUTION_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 导入表格文件（追加,不去重）
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// 过滤 + 排序后的记录列表
    List(ViewArgs),
    /// 区域汇总卡片
    Summary {
        #[arg(long, default_value = "all")]
        region: String,
    },
    /// 司机列表
    Drivers {
        #[arg(long, default_value = "")]
        region: String,
    },
    /// 人工新增记录
    Add {
        driver: String,
        #[arg(long)]
        count: Option<String>,
        #[arg(long)]
        region: Option<String>,
        /// RFC 3339 或 YYYY-MM-DDTHH:MM
        #[arg(long)]
        at: Option<String>,
    },
    /// 设置失败数
    Failure { record_id: String, value: String },
    /// 对过滤结果批量设置线路
    BatchRoute {
        route: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// 查看全部配置,或写入一项
    Config {
        #[arg(requires = "value")]
        key: Option<String>,
        value: Option<String>,
    },
    /// 清空全部记录
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct FilterArgs {
    #[arg(long, default_value = "")]
    pub search: String,
    /// "" / all / SP / RJ
    #[arg(long, default_value = "")]
    pub region: String,
    #[arg(long, default_value = "")]
    pub driver: String,
}

#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    #[arg(long, value_parser = parse_sort_key)]
    pub sort: Option<SortKey>,
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl FilterArgs {
    fn to_query(&self) -> ViewQuery {
        ViewQuery {
            search: self.search.clone(),
            region: self.region.clone(),
            driver: self.driver.clone(),
            sort: None,
        }
    }
}

impl ViewArgs {
    fn to_query(&self) -> ViewQuery {
        ViewQuery {
            sort: self.sort.map(|key| SortState {
                key,
                direction: if self.desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
            }),
            ..self.filter.to_query()
        }
    }
}

fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    raw.parse()
}

/// 执行命令,输出 JSON 到标准输出
pub async fn run(cli: Cli) -> Result<()> {
    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let api = &state.dashboard_api;

    let output = match cli.command {
        Command::Import { files } => {
            let mut reports = Vec::new();
            for (path, result) in files.iter().zip(api.import_files(&files).await) {
                match result {
                    Ok(report) => reports.push(to_json(&report)?),
                    Err(e) => {
                        tracing::error!(file = %path.display(), error = %e, "导入失败");
                        reports.push(json!({
                            "source": path.display().to_string(),
                            "error": e.to_string(),
                            "code": e.code(),
                        }));
                    }
                }
            }
            Value::Array(reports)
        }
        Command::List(view) => {
            let rows = api
                .list_records(&view.to_query())
                .await
                .context("读取记录列表失败")?;
            to_json(&rows)?
        }
        Command::Summary { region } => {
            let cards = api
                .visible_summaries(&region)
                .with_context(|| format!("读取区域汇总失败: {}", region))?;
            to_json(&cards)?
        }
        Command::Drivers { region } => {
            let drivers = api
                .drivers(&region)
                .with_context(|| format!("读取司机列表失败: {}", region))?;
            to_json(&drivers)?
        }
        Command::Add {
            driver,
            count,
            region,
            at,
        } => {
            let request = ManualRecordRequest {
                driver,
                ordered_count: count,
                region,
                timestamp: at,
            };
            let id = api.add_manual(request).await.context("人工新增失败")?;
            json!({ "id": id })
        }
        Command::Failure { record_id, value } => {
            let changed = api
                .set_failure_count(&record_id, &value)
                .with_context(|| format!("设置失败数失败: {}", record_id))?;
            json!({ "changed": changed })
        }
        Command::BatchRoute { route, filter } => {
            let changed = api
                .apply_batch_route(&route, &filter.to_query())
                .context("批量设置线路失败")?;
            json!({ "changed": changed })
        }
        Command::Config { key: None, .. } => {
            let snapshot = state
                .config_manager
                .get_config_snapshot()
                .map_err(|e| anyhow!("读取配置失败: {}", e))?;
            to_json(&snapshot)?
        }
        Command::Config {
            key: Some(key),
            value,
        } => {
            let value = value.unwrap_or_default();
            state
                .config_manager
                .set_config_value(&key, &value)
                .map_err(|e| anyhow!("写入配置失败 {}: {}", key, e))?;
            let mut updated = serde_json::Map::new();
            updated.insert(key, Value::String(value));
            Value::Object(updated)
        }
        Command::Clear => {
            api.clear_all().context("清空记录失败")?;
            json!({ "cleared": true })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("序列化输出失败")
}
