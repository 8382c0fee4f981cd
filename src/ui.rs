use crate::models::DisplaySnapshot;

pub fn render_index(snapshot: &DisplaySnapshot) -> String {
    let celebration_class = if snapshot.celebration.active {
        "celebration active"
    } else {
        "celebration"
    };
    INDEX_HTML
        .replace("{{DAYS}}", &escape(&snapshot.days_number))
        .replace("{{LABEL}}", &escape(&snapshot.days_label))
        .replace("{{WIDTH}}", &escape(&snapshot.progress_width))
        .replace("{{CYCLE}}", &escape(&snapshot.cycle_indicator))
        .replace("{{CELEBRATION_CLASS}}", celebration_class)
        .replace("{{CELEBRATION}}", &escape(&snapshot.celebration.text))
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Cycle Countdown</title>
  <style>
    :root {
      --bg: #eef6e8;
      --ink: #23402a;
      --accent: #5fa35a;
      --track: rgba(35, 64, 42, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg), #d9ecd0);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      overflow: hidden;
    }

    .card {
      text-align: center;
      display: grid;
      gap: 18px;
      width: min(560px, 90vw);
    }

    .days {
      font-size: clamp(5rem, 22vw, 11rem);
      font-weight: 700;
      line-height: 1;
    }

    .label {
      font-size: 1.6rem;
      letter-spacing: 0.08em;
    }

    .track {
      height: 14px;
      border-radius: 999px;
      background: var(--track);
      overflow: hidden;
    }

    .bar {
      height: 100%;
      background: var(--accent);
      transition: width 600ms ease;
    }

    .cycle {
      font-size: 1.1rem;
      opacity: 0.7;
    }

    .celebration {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      font-size: 5rem;
      opacity: 0;
      pointer-events: none;
      transition: opacity 300ms ease;
    }

    .celebration.active {
      opacity: 1;
    }

    .floating-emoji {
      position: fixed;
      bottom: -3rem;
      font-size: 2rem;
      pointer-events: none;
      animation-name: float-up;
      animation-timing-function: linear;
      animation-fill-mode: forwards;
    }

    @keyframes float-up {
      to {
        transform: translateY(-110vh);
        opacity: 0;
      }
    }
  </style>
</head>
<body>
  <main class="card">
    <div class="days" id="daysNumber">{{DAYS}}</div>
    <div class="label" id="daysLabel">{{LABEL}}</div>
    <div class="track"><div class="bar" id="progressBar" style="width: {{WIDTH}}"></div></div>
    <div class="cycle" id="cycleIndicator">{{CYCLE}}</div>
  </main>
  <div class="{{CELEBRATION_CLASS}}" id="celebration">{{CELEBRATION}}</div>
  <div id="emojiContainer"></div>

  <script>
    const daysNumberEl = document.getElementById('daysNumber');
    const daysLabelEl = document.getElementById('daysLabel');
    const progressBarEl = document.getElementById('progressBar');
    const cycleIndicatorEl = document.getElementById('cycleIndicator');
    const celebrationEl = document.getElementById('celebration');
    const containerEl = document.getElementById('emojiContainer');
    const shown = new Map();

    const setText = (el, value) => {
      if (el.textContent !== value) {
        el.textContent = value;
      }
    };

    const paint = (snapshot) => {
      setText(daysNumberEl, snapshot.days_number);
      setText(daysLabelEl, snapshot.days_label);
      setText(cycleIndicatorEl, snapshot.cycle_indicator);
      setText(celebrationEl, snapshot.celebration.text);
      progressBarEl.style.width = snapshot.progress_width;
      celebrationEl.classList.toggle('active', snapshot.celebration.active);

      const live = new Set();
      snapshot.particles.forEach((particle) => {
        live.add(particle.id);
        if (shown.has(particle.id)) {
          return;
        }
        const el = document.createElement('div');
        el.className = 'floating-emoji';
        el.textContent = particle.symbol;
        el.style.left = particle.left_percent + '%';
        el.style.animationDuration = particle.duration_secs + 's';
        containerEl.appendChild(el);
        shown.set(particle.id, el);
      });
      shown.forEach((el, id) => {
        if (!live.has(id)) {
          el.remove();
          shown.delete(id);
        }
      });
    };

    const refresh = async () => {
      const res = await fetch('/api/display');
      if (res.ok) {
        paint(await res.json());
      }
    };

    const post = (path, body) =>
      fetch(path, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body || {})
      }).catch((err) => console.log('relay failed:', err));

    document.addEventListener('visibilitychange', () => {
      post('/api/visibility', { visible: document.visibilityState === 'visible' });
      if (document.visibilityState === 'visible') {
        refresh().catch(() => {});
      }
    });

    const interacted = () => post('/api/interaction');
    document.addEventListener('touchstart', interacted, { once: true });
    document.addEventListener('click', interacted, { once: true });

    setInterval(() => refresh().catch(() => {}), 1000);
    refresh().catch(() => {});
  </script>
</body>
</html>
"#;
