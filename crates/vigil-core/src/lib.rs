//! vigil-core
//!
//! Core building blocks for the Vigil payment-status watcher.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（status, snapshot, ids, route, errors）
//! - **ports**: 抽象化レイヤー（StatusSource, Navigator, Notifier, Clock）
//! - **app**: アプリケーションロジック（checker, poller, view, countdown, config）
//! - **impls**: 実装（InMemoryStatusSource などテスト・デモ用）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
