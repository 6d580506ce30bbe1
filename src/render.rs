//! Game page templating. Every dynamic value is escaped for the context it
//! lands in: HTML text/attributes for markup, JS string literals for the
//! inline script.

use std::fmt::Write;

use crate::{
    constants::GRID_SIZE,
    models::UserSummary,
    utils::{escape_html, js_string_literal},
};

/// Client-side polling behaviour baked into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    pub poll_interval_ms: u64,
    pub max_backoff_ms: u64,
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
      <meta charset="UTF-8">
      <meta name="viewport" content="width=device-width, initial-scale=1.0">
      <title>Catch the squirrel</title>
      <script src="https://cdn.tailwindcss.com"></script>
      <script>
        tailwind.config = {
          theme: {
            extend: {
              colors: {
                mint: '#00c88c',
                darkMint: '#03a876',
                lightMint: '#abe7d2',
                forest: '#25392b'
              },
              spacing: {
                '50': '50rem'
              }
            }
          }
        }
      </script>
  </head>
  <body class="bg-gradient-to-br from-darkMint to-lightMint min-h-screen p-4">
      <div class="flex h-full">
          <div id="game-window" class="w-3/4 bg-white rounded-lg shadow-lg p-4 mr-4 relative">
              <h2 class="text-2xl font-bold mb-4">Catch the squirrel</h2>
              <div id="game-area" class="bg-gray-200 h-50 w-fill rounded-lg relative">
                  <div id="squirrel" class="w-8 h-8 absolute text-2xl" role="img" aria-label="Squirrel" style="transition: all 0.3s ease-in-out;">&#x1F43F;&#xFE0F;</div>
              </div>
          </div>
          <div id="player-list" class="w-1/4 bg-white rounded-lg shadow-lg p-4">
              <h2 class="text-2xl font-bold mb-4">Player List</h2>
              <ul id="players" class="space-y-2">
"#;

const PAGE_SCRIPT_OPEN: &str = r#"              </ul>
          </div>
      </div>

      <script>
"#;

const PAGE_SCRIPT_BODY: &str = r#"
          const controller = new AbortController();
          window.addEventListener('pagehide', () => controller.abort());

          function sleep(ms, signal) {
              return new Promise((resolve) => {
                  const timer = setTimeout(resolve, ms);
                  signal.addEventListener('abort', () => {
                      clearTimeout(timer);
                      resolve();
                  }, { once: true });
              });
          }

          function moveSquirrel(x, y) {
              const squirrel = document.getElementById('squirrel');
              const gameArea = document.getElementById('game-area');
              const cellSize = gameArea.clientWidth / gridSize;

              squirrel.style.left = ((x - 1) * cellSize) + 'px';
              squirrel.style.top = ((y - 1) * cellSize) + 'px';
          }

          function renderPlayers(players) {
              const playerList = document.getElementById('players');
              const items = players.map((player) => {
                  const li = document.createElement('li');
                  li.id = player.id;
                  li.textContent = player.username + ' (Level ' + player.level + ')';
                  li.className = player.id === currentPlayer.id
                      ? 'bg-gray-100 p-2 rounded font-bold'
                      : 'bg-gray-100 p-2 rounded';
                  return li;
              });
              if (items.length > 0) {
                  playerList.replaceChildren(...items);
              }
          }

          async function pollGameState() {
              let delay = pollIntervalMs;
              while (!controller.signal.aborted) {
                  try {
                      const res = await fetch('/api/v1/game/state', {
                          headers: { Authorization: 'Bearer ' + token },
                          signal: controller.signal,
                      });
                      if (res.status === 401) {
                          window.location.reload();
                          return;
                      }
                      if (!res.ok) {
                          throw new Error('game state request failed: ' + res.status);
                      }
                      const body = await res.json();
                      moveSquirrel(body.data.squirrel.x, body.data.squirrel.y);
                      renderPlayers(body.data.players);
                      delay = pollIntervalMs;
                  } catch (err) {
                      if (controller.signal.aborted) {
                          return;
                      }
                      delay = Math.min(delay * 2, maxBackoffMs);
                      console.warn(err);
                  }
                  await sleep(delay, controller.signal);
              }
          }

          window.onload = function() {
              moveSquirrel(1, 1);
              pollGameState();
          };
      </script>
  </body>
</html>
"#;

/// Renders the full game page for `user`, embedding `token` for cache reads.
pub fn render_game_page(user: &UserSummary, token: &str, settings: PageSettings) -> String {
    let mut html = String::with_capacity(PAGE_HEAD.len() + PAGE_SCRIPT_BODY.len() + 1024);
    html.push_str(PAGE_HEAD);

    // Writing into a String cannot fail.
    let _ = writeln!(
        html,
        r#"                  <li class="bg-gray-100 p-2 rounded font-bold" id="{}">{} (Level {})</li>"#,
        escape_html(&user.id),
        escape_html(&user.username),
        user.level
    );

    html.push_str(PAGE_SCRIPT_OPEN);
    let _ = writeln!(html, "          const token = {};", js_string_literal(token));
    let _ = writeln!(
        html,
        "          const currentPlayer = {{ id: {}, username: {}, level: {} }};",
        js_string_literal(&user.id),
        js_string_literal(&user.username),
        user.level
    );
    let _ = writeln!(html, "          const gridSize = {};", GRID_SIZE);
    let _ = writeln!(html, "          const pollIntervalMs = {};", settings.poll_interval_ms);
    let _ = writeln!(
        html,
        "          const maxBackoffMs = {};",
        settings.max_backoff_ms.max(settings.poll_interval_ms)
    );
    html.push_str(PAGE_SCRIPT_BODY);

    html
}
