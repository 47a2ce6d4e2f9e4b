//! The page served to the browser. It relays queued requests to the injected wallet
//! (`window.ethereum`) and reports its notifications back.

use crate::provider::ProviderOptions;

const TOKEN_PLACEHOLDER: &str = "__SESSION_TOKEN__";
const CONFIG_PLACEHOLDER: &str = "__BRIDGE_CONFIG__";

/// Renders the relay page for one session.
pub(crate) fn render(session_token: &str, options: &ProviderOptions) -> String {
    let config = serde_json::json!({
        "name": options.metadata.name,
        "description": options.metadata.description,
        "chains": options.chains,
    });
    INDEX_HTML
        .replace(TOKEN_PLACEHOLDER, &script_string(&serde_json::Value::from(session_token)))
        .replace(CONFIG_PLACEHOLDER, &script_string(&config))
}

/// JSON that is safe to inline in a `<script>` block.
fn script_string(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>CoinPay wallet bridge</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 36rem; margin: 4rem auto; color: #222; }
    code { background: #f3f3f3; padding: 0 .25rem; }
    #status { font-weight: 600; }
  </style>
</head>
<body>
  <h1 id="title">CoinPay</h1>
  <p id="description"></p>
  <p>Status: <span id="status">waiting for wallet</span></p>
  <p id="account"></p>
  <script>
    const SESSION_TOKEN = __SESSION_TOKEN__;
    const CONFIG = __BRIDGE_CONFIG__;
    const headers = { "Content-Type": "application/json", "X-Session-Token": SESSION_TOKEN };

    document.getElementById("title").textContent = CONFIG.name;
    document.getElementById("description").textContent = CONFIG.description;

    function setStatus(text) {
      document.getElementById("status").textContent = text;
    }

    async function post(path, body) {
      await fetch(path, { method: "POST", headers, body: JSON.stringify(body) });
    }

    function subscribe(ethereum) {
      ethereum.on("accountsChanged", (accounts) => {
        document.getElementById("account").textContent = accounts[0] || "";
        post("/api/event", { event: "accountsChanged", accounts });
      });
      ethereum.on("chainChanged", (chainId) => post("/api/event", { event: "chainChanged", chainId }));
      ethereum.on("disconnect", () => post("/api/event", { event: "disconnect" }));
    }

    async function relay(ethereum, request) {
      setStatus("waiting for approval of " + request.method);
      try {
        const result = await ethereum.request({ method: request.method, params: request.params });
        await post("/api/response", { id: request.id, result: result === undefined ? null : result });
      } catch (err) {
        const error = { code: err && err.code !== undefined ? err.code : -32603, message: (err && err.message) || String(err) };
        await post("/api/response", { id: request.id, error });
      }
      setStatus("connected");
    }

    async function poll(ethereum) {
      try {
        const res = await fetch("/api/request", { headers });
        if (res.status === 403) {
          setStatus("session expired, restart the command");
          return;
        }
        const body = await res.json();
        if (body.status === "ok") {
          await relay(ethereum, body.data);
        }
      } catch (_) {
        setStatus("bridge closed");
        return;
      }
      setTimeout(() => poll(ethereum), 500);
    }

    if (!window.ethereum) {
      setStatus("no injected wallet found, install a browser wallet extension");
    } else {
      subscribe(window.ethereum);
      setStatus("ready");
      poll(window.ethereum);
    }
  </script>
</body>
</html>
"#;
