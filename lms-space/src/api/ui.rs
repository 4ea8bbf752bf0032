//! Dashboard page
//!
//! One HTML document with vanilla JS. The 3D scatter is drawn client-side by
//! Plotly; every interaction goes through the JSON endpoints in
//! [`super::session`].

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// GET /
pub async fn root_page() -> impl IntoResponse {
    let build_timestamp = env!("BUILD_TIMESTAMP");
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = env!("GIT_HASH");
    let build_profile = env!("BUILD_PROFILE");

    let html = format!(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lab Music Space</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }}
        header {{
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 16px 20px;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }}
        h1 {{
            font-size: 24px;
            color: #4a9eff;
        }}
        .build-info {{
            font-family: 'Courier New', monospace;
            font-size: 13px;
            color: #888;
            text-align: right;
            line-height: 1.2;
        }}
        .container {{
            padding: 20px;
        }}
        .panel {{
            background-color: #2a2a2a;
            border: 1px solid #3a3a3a;
            border-radius: 6px;
            padding: 16px;
            margin-bottom: 16px;
        }}
        .row {{
            display: flex;
            gap: 10px;
            align-items: end;
            flex-wrap: wrap;
        }}
        label {{
            display: block;
            font-size: 13px;
            color: #aaa;
        }}
        input, select {{
            background: #1a1a1a;
            color: #e0e0e0;
            border: 1px solid #444;
            border-radius: 4px;
            padding: 6px 8px;
        }}
        button {{
            padding: 7px 16px;
            background: #0066cc;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }}
        button:hover {{
            background: #0052a3;
        }}
        .hidden {{
            display: none;
        }}
        .alert {{
            background: #203040;
            border-left: 4px solid #4a9eff;
            padding: 10px 14px;
            margin-bottom: 12px;
        }}
        #notice {{
            position: fixed;
            top: 16px;
            right: 16px;
            padding: 10px 16px;
            border-radius: 4px;
            display: none;
        }}
        #notice.error {{
            display: block;
            background: #7a1f1f;
        }}
        #notice.success {{
            display: block;
            background: #1f5a2a;
        }}
        .space {{
            display: flex;
            gap: 16px;
        }}
        #plot {{
            flex: 1;
            height: 640px;
        }}
        #detail {{
            width: 260px;
        }}
        #detail img {{
            width: 100%;
            border-radius: 4px;
        }}
    </style>
</head>
<body>
    <header>
        <h1>Lab Music Space</h1>
        <div class="build-info">
            <div>v{version} [{git_hash}]</div>
            <div>{build_timestamp} ({build_profile})</div>
        </div>
    </header>
    <div id="notice"></div>
    <div class="container">
        <div id="lock" class="panel">
            <p>Hint: c#1</p>
            <div class="row">
                <div>
                    <label for="password">Password</label>
                    <input id="password" type="password" placeholder="Press Enter to confirm">
                </div>
                <button id="unlock">Enter Password</button>
            </div>
        </div>

        <div id="main" class="hidden">
            <div class="alert">Welcome to Lab Music Space!</div>
            <div class="alert">
                Input the name and favorite song of new lab member to show in music space.
                Hover over individual points to see more info.
            </div>
            <div class="panel row">
                <div>
                    <label for="member">New Member</label>
                    <input id="member">
                </div>
                <div>
                    <label for="reference">Spotify Link</label>
                    <input id="reference" size="48">
                </div>
                <button id="add">Add Member</button>
            </div>
            <div class="panel row">
                <div>
                    <label for="method">Embedding</label>
                    <select id="method">
                        <option value="pca">PCA</option>
                        <option value="isomap">Isomap</option>
                        <option value="spectral">Spectral</option>
                    </select>
                </div>
                <div>
                    <label for="neighbors">Neighbors: <span id="neighbors-value">5</span></label>
                    <input id="neighbors" type="range" min="1" max="5" value="5">
                </div>
                <div>
                    <label for="policy">Fit</label>
                    <select id="policy">
                        <option value="reference_only">Organization only</option>
                        <option value="global">All points</option>
                    </select>
                </div>
                <button id="apply">Apply</button>
            </div>
            <div class="space">
                <div id="plot"></div>
                <div id="detail" class="panel"></div>
            </div>
        </div>
    </div>

    <script>
        const $ = (id) => document.getElementById(id);

        function notify(kind, text) {{
            const n = $('notice');
            n.className = kind;
            n.textContent = text;
            setTimeout(() => {{ n.className = ''; }}, 4000);
        }}

        async function call(method, url, body) {{
            const opts = {{ method, headers: {{ 'Content-Type': 'application/json' }} }};
            if (body !== undefined) opts.body = JSON.stringify(body);
            const res = await fetch(url, opts);
            const data = await res.json();
            if (!res.ok) throw new Error(data.error ? data.error.message : res.statusText);
            return data;
        }}

        function escapeHtml(text) {{
            const span = document.createElement('span');
            span.textContent = text || '';
            return span.innerHTML;
        }}

        function hoverText(p) {{
            return `member=${{escapeHtml(p.member)}}<br>artist=${{escapeHtml(p.artist)}}`
                + `<br>name=${{escapeHtml(p.title)}}`;
        }}

        function traces(points) {{
            const byKey = new Map();
            for (const p of points) {{
                const key = p.annotated ? p.member : (p.group || '');
                if (!byKey.has(key)) {{
                    byKey.set(key, {{
                        type: 'scatter3d', mode: 'markers', name: key,
                        x: [], y: [], z: [], text: [], customdata: [],
                        hovertemplate: '%{{text}}<extra></extra>',
                        marker: {{ size: p.annotated ? 7 : 4, color: p.color }},
                    }});
                }}
                const t = byKey.get(key);
                t.x.push(p.x); t.y.push(p.y); t.z.push(p.z);
                t.text.push(hoverText(p));
                t.customdata.push(p.id);
            }}
            return [...byKey.values()];
        }}

        function annotation(p) {{
            return {{ x: p.x, y: p.y, z: p.z, text: escapeHtml(p.member), font: {{ color: p.color }} }};
        }}

        function draw(space) {{
            const annotated = space.points.filter((p) => p.annotated);
            const layout = {{
                autosize: true,
                template: 'plotly_dark',
                paper_bgcolor: '#1a1a1a',
                font: {{ color: '#e0e0e0' }},
                margin: {{ l: 0, r: 0, t: 0, b: 0 }},
                scene: {{
                    xaxis: {{ title: 'pc0' }}, yaxis: {{ title: 'pc1' }}, zaxis: {{ title: 'pc2' }},
                    annotations: annotated.map(annotation),
                }},
            }};
            Plotly.newPlot('plot', traces(space.points), layout);
            $('plot').on('plotly_hover', (ev) => {{
                const id = ev.points[0].customdata;
                call('POST', '/api/hover', {{ id }}).then((r) => showDetail(r.track)).catch(() => {{}});
            }});

            const [lo, hi] = space.neighbor_bounds;
            const slider = $('neighbors');
            slider.min = lo;
            slider.max = hi;
            if (space.n_neighbors) slider.value = space.n_neighbors;
            $('neighbors-value').textContent = slider.value;
            $('method').value = space.method;
            $('policy').value = space.fit_policy;
        }}

        // member names are user input: text nodes only
        function textNode(tag, text) {{
            const el = document.createElement(tag);
            el.textContent = text || '';
            return el;
        }}

        function showDetail(p) {{
            const d = $('detail');
            d.replaceChildren();
            if (!p) return;
            if (p.artwork) {{
                const img = document.createElement('img');
                img.src = p.artwork;
                img.alt = '';
                d.appendChild(img);
            }}
            d.append(
                textNode('h3', p.title),
                textNode('p', p.artist),
                textNode('p', p.album),
                textNode('p', p.annotated ? p.member : `${{p.group}} / ${{p.member}}`),
            );
        }}

        async function unlock() {{
            const password = $('password').value;
            if (!password) return;
            try {{
                const r = await call('POST', '/api/unlock', {{ password }});
                notify('success', r.message);
                $('lock').classList.add('hidden');
                $('main').classList.remove('hidden');
                draw(r.space);
            }} catch (e) {{
                notify('error', e.message);
            }}
        }}

        async function addMember() {{
            try {{
                const r = await call('POST', '/api/members', {{
                    member: $('member').value,
                    reference: $('reference').value,
                }});
                if (!r.added) {{ notify('success', r.message); return; }}
                const pending = await call('POST', '/api/annotations/render');
                for (const p of pending.annotations) {{
                    Plotly.addTraces('plot', traces([p]));
                    const scene = $('plot').layout.scene;
                    Plotly.relayout('plot', {{
                        'scene.annotations': [...(scene.annotations || []), annotation(p)],
                    }});
                }}
            }} catch (e) {{
                notify('error', e.message);
            }}
        }}

        async function applyEmbedding() {{
            const method = $('method').value;
            const body = {{ method, fit_policy: $('policy').value }};
            if (method !== 'pca') body.n_neighbors = Number($('neighbors').value);
            try {{
                draw(await call('PUT', '/api/embedding', body));
            }} catch (e) {{
                notify('error', e.message);
            }}
        }}

        $('unlock').addEventListener('click', unlock);
        $('password').addEventListener('keydown', (e) => {{ if (e.key === 'Enter') unlock(); }});
        $('add').addEventListener('click', addMember);
        $('apply').addEventListener('click', applyEmbedding);
        $('neighbors').addEventListener('input', (e) => {{ $('neighbors-value').textContent = e.target.value; }});

        call('GET', '/api/space').then((space) => {{
            $('lock').classList.add('hidden');
            $('main').classList.remove('hidden');
            draw(space);
        }}).catch(() => {{}});
    </script>
</body>
</html>
"#,
        version = version,
        git_hash = git_hash,
        build_timestamp = build_timestamp,
        build_profile = build_profile,
    );

    Html(html)
}
