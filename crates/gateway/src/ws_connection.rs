//! WebSocket 连接生命周期
//!
//! 单个连接的收发循环：出站帧经 mpsc 通道解耦，入站帧按到达顺序
//! 依次处理（同一连接串行，不同连接并发）。

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::auth::AuthenticatedUser;
use crate::error::invalid_payload_error;
use crate::events::ClientEvent;
use crate::registry::{ConnectionId, OutboundFrame};
use crate::state::AppState;

pub(crate) async fn serve_socket(socket: WebSocket, state: AppState, user: AuthenticatedUser) {
    let conn_id = ConnectionId::random();
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundFrame>();

    tracing::info!(connection_id = %conn_id, user_id = %user.user_id, "WebSocket connection established");
    state.dispatcher.handle_connect(conn_id, user, tx).await;

    let (mut sink, mut incoming) = socket.split();

    // 发送任务：唯一向 sink 写入的地方
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                OutboundFrame::Text(payload) => WsMessage::Text(payload.into()),
                OutboundFrame::Pong(data) => WsMessage::Pong(data.into()),
            };
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    // 接收任务：同一连接的事件按到达顺序处理
    let recv_state = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(result) = incoming.next().await {
            let message = match result {
                Ok(message) => message,
                Err(err) => {
                    tracing::debug!(connection_id = %conn_id, error = %err, "WebSocket read error");
                    break;
                }
            };
            match message {
                WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        recv_state.dispatcher.handle_event(conn_id, event).await;
                    }
                    Err(err) => {
                        tracing::debug!(connection_id = %conn_id, error = %err, "rejected malformed frame");
                        recv_state
                            .dispatcher
                            .registry()
                            .send_to(conn_id, &invalid_payload_error())
                            .await;
                    }
                },
                WsMessage::Ping(data) => {
                    recv_state
                        .dispatcher
                        .registry()
                        .send_pong(conn_id, data.to_vec())
                        .await;
                }
                WsMessage::Close(_) => break,
                WsMessage::Binary(_) | WsMessage::Pong(_) => {}
            }
        }
    });

    // 任一方向结束即认为连接关闭
    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    state.dispatcher.handle_disconnect(conn_id).await;
    tracing::info!(connection_id = %conn_id, "WebSocket connection closed");
}
